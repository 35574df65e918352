//! Flat voxel storage over a [`VoxelArea`].

use glam::IVec3;

use crate::area::VoxelArea;
use crate::cell::{IGNORE, VoxelCell};

/// Exclusively owned voxel storage for one generation pass.
///
/// New buffers start IGNORE-filled ("unknown"). `data` is deliberately
/// public: the generation loops walk it by precomputed index, the way the
/// area's stride arithmetic intends.
pub struct VoxelBuffer {
    pub area: VoxelArea,
    pub data: Vec<VoxelCell>,
}

impl VoxelBuffer {
    pub fn new(area: VoxelArea) -> Self {
        Self::filled(area, VoxelCell::new(IGNORE))
    }

    pub fn filled(area: VoxelArea, cell: VoxelCell) -> Self {
        Self {
            area,
            data: vec![cell; area.volume() as usize],
        }
    }

    pub fn fill(&mut self, cell: VoxelCell) {
        self.data.fill(cell);
    }

    /// Cell at `p`, which must lie inside the buffer's area.
    pub fn get(&self, p: IVec3) -> VoxelCell {
        debug_assert!(self.area.contains(p), "read outside buffer at {p}");
        self.data[self.area.index_p(p) as usize]
    }

    pub fn set(&mut self, p: IVec3, cell: VoxelCell) {
        debug_assert!(self.area.contains(p), "write outside buffer at {p}");
        let i = self.area.index_p(p) as usize;
        self.data[i] = cell;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::ContentId;

    #[test]
    fn test_new_buffer_is_ignore_filled() {
        let buf = VoxelBuffer::new(VoxelArea::new(IVec3::ZERO, IVec3::splat(3)));
        assert!(buf.data.iter().all(|c| c.content == IGNORE));
    }

    #[test]
    fn test_set_then_get_round_trips() {
        let mut buf = VoxelBuffer::new(VoxelArea::new(IVec3::splat(-4), IVec3::splat(4)));
        let p = IVec3::new(-1, 2, 3);
        let cell = VoxelCell::with_params(ContentId(9), 1, 2);
        buf.set(p, cell);
        assert_eq!(buf.get(p), cell);
        assert_eq!(buf.get(IVec3::ZERO).content, IGNORE);
    }
}
