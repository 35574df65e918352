//! Sparse block-aligned world storage.
//!
//! The map holds `MAP_BLOCKSIZE`-cubed blocks keyed by block position.
//! Stand-alone placement paths read a block-aligned region into a
//! [`VoxelBuffer`], mutate it, and blit the result back; cells of unloaded
//! blocks read as IGNORE and are never written back.

use glam::IVec3;
use hashbrown::HashMap;

use crate::area::VoxelArea;
use crate::buffer::VoxelBuffer;
use crate::cell::{IGNORE, MAP_BLOCKSIZE, VoxelCell};

const BLOCK_VOLUME: usize = (MAP_BLOCKSIZE * MAP_BLOCKSIZE * MAP_BLOCKSIZE) as usize;

/// Block position containing the voxel position `p`.
pub fn block_pos(p: IVec3) -> IVec3 {
    p.div_euclid(IVec3::splat(MAP_BLOCKSIZE))
}

fn block_index(local: IVec3) -> usize {
    ((local.z * MAP_BLOCKSIZE + local.y) * MAP_BLOCKSIZE + local.x) as usize
}

/// Sparse voxel world keyed by block position.
#[derive(Default)]
pub struct VoxelMap {
    blocks: HashMap<IVec3, Box<[VoxelCell; BLOCK_VOLUME]>>,
}

impl VoxelMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cell at `p`; IGNORE when the containing block is not loaded.
    pub fn get(&self, p: IVec3) -> VoxelCell {
        let bp = block_pos(p);
        match self.blocks.get(&bp) {
            Some(block) => block[block_index(p - bp * MAP_BLOCKSIZE)],
            None => VoxelCell::new(IGNORE),
        }
    }

    /// Writes a cell, materialising the containing block (AIR-filled) if it
    /// was not loaded.
    pub fn set(&mut self, p: IVec3, cell: VoxelCell) {
        let bp = block_pos(p);
        let block = self
            .blocks
            .entry(bp)
            .or_insert_with(|| Box::new([VoxelCell::new(crate::cell::AIR); BLOCK_VOLUME]));
        block[block_index(p - bp * MAP_BLOCKSIZE)] = cell;
    }

    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// Copies a region into a fresh buffer; unloaded cells read as IGNORE.
    pub fn read_area(&self, area: VoxelArea) -> VoxelBuffer {
        let mut buf = VoxelBuffer::new(area);
        let mut i = 0;
        for z in area.min_edge.z..=area.max_edge.z {
            for y in area.min_edge.y..=area.max_edge.y {
                for x in area.min_edge.x..=area.max_edge.x {
                    buf.data[i] = self.get(IVec3::new(x, y, z));
                    i += 1;
                }
            }
        }
        buf
    }
}

impl VoxelMap {
    /// Writes every non-IGNORE cell of the buffer back into the map.
    pub fn blit_back(&mut self, buf: &VoxelBuffer) {
        let area = buf.area;
        let mut i = 0;
        for z in area.min_edge.z..=area.max_edge.z {
            for y in area.min_edge.y..=area.max_edge.y {
                for x in area.min_edge.x..=area.max_edge.x {
                    let cell = buf.data[i];
                    i += 1;
                    if cell.content == IGNORE {
                        continue;
                    }
                    self.set(IVec3::new(x, y, z), cell);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::{AIR, ContentId};

    #[test]
    fn test_unloaded_cells_read_ignore() {
        let map = VoxelMap::new();
        assert_eq!(map.get(IVec3::new(5, -40, 123)).content, IGNORE);
    }

    #[test]
    fn test_set_materialises_air_filled_block() {
        let mut map = VoxelMap::new();
        map.set(IVec3::new(1, 2, 3), VoxelCell::new(ContentId(7)));
        assert_eq!(map.block_count(), 1);
        assert_eq!(map.get(IVec3::new(1, 2, 3)).content, ContentId(7));
        assert_eq!(map.get(IVec3::new(0, 0, 0)).content, AIR);
    }

    #[test]
    fn test_block_pos_floors_negative_coordinates() {
        assert_eq!(block_pos(IVec3::new(0, 15, 16)), IVec3::new(0, 0, 1));
        assert_eq!(block_pos(IVec3::new(-1, -16, -17)), IVec3::new(-1, -1, -2));
    }

    #[test]
    fn test_read_area_blit_back_round_trips() {
        let mut map = VoxelMap::new();
        map.set(IVec3::new(3, 3, 3), VoxelCell::new(ContentId(2)));

        let area = VoxelArea::new(IVec3::ZERO, IVec3::splat(15));
        let mut buf = map.read_area(area);
        assert_eq!(buf.get(IVec3::new(3, 3, 3)).content, ContentId(2));

        buf.set(IVec3::new(4, 4, 4), VoxelCell::new(ContentId(9)));
        map.blit_back(&buf);
        assert_eq!(map.get(IVec3::new(4, 4, 4)).content, ContentId(9));
        assert_eq!(map.get(IVec3::new(3, 3, 3)).content, ContentId(2));
    }

    #[test]
    fn test_blit_back_skips_ignore_cells() {
        let mut map = VoxelMap::new();
        // Buffer straddles a loaded and an unloaded block; the unloaded half
        // stays IGNORE in the buffer and must not materialise on blit.
        map.set(IVec3::new(0, 0, 0), VoxelCell::new(ContentId(1)));
        let area = VoxelArea::new(IVec3::new(0, 0, 0), IVec3::new(15, 31, 15));
        let buf = map.read_area(area);
        let mut map2 = VoxelMap::new();
        map2.blit_back(&buf);
        assert_eq!(map2.block_count(), 1, "IGNORE cells must not create blocks");
    }
}
