//! Axis-aligned inclusive voxel box with linear index arithmetic.
//!
//! An area linearises positions to indices with fixed strides: x varies
//! fastest, then y (stride `extent.x`), then z (stride `extent.x *
//! extent.y`). Indices may be computed for positions outside the box; they
//! must pass [`VoxelArea::contains_index`] before being used to address
//! storage.

use glam::IVec3;

/// Inclusive box `[min_edge, max_edge]` over voxel coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VoxelArea {
    pub min_edge: IVec3,
    pub max_edge: IVec3,
}

impl VoxelArea {
    pub fn new(min_edge: IVec3, max_edge: IVec3) -> Self {
        debug_assert!(
            min_edge.cmple(max_edge).all(),
            "degenerate area {min_edge}..{max_edge}"
        );
        Self { min_edge, max_edge }
    }

    /// Edge lengths of the box (every component at least 1).
    pub fn extent(&self) -> IVec3 {
        self.max_edge - self.min_edge + IVec3::ONE
    }

    pub fn volume(&self) -> i32 {
        let e = self.extent();
        e.x * e.y * e.z
    }

    /// Linear index of `(x, y, z)`. Positions outside the box yield indices
    /// outside `0..volume()` or aliases; check before dereferencing.
    pub fn index(&self, x: i32, y: i32, z: i32) -> i32 {
        let e = self.extent();
        (z - self.min_edge.z) * e.x * e.y + (y - self.min_edge.y) * e.x + (x - self.min_edge.x)
    }

    pub fn index_p(&self, p: IVec3) -> i32 {
        self.index(p.x, p.y, p.z)
    }

    /// Componentwise containment of a position.
    pub fn contains(&self, p: IVec3) -> bool {
        p.cmpge(self.min_edge).all() && p.cmple(self.max_edge).all()
    }

    /// Whether a previously computed index addresses a cell of this box.
    pub fn contains_index(&self, i: i32) -> bool {
        i >= 0 && i < self.volume()
    }

    /// Advances a linear index by `d` steps in y, reusing the precomputed
    /// extent `em` instead of recomputing strides.
    pub fn add_y(em: IVec3, i: &mut i32, d: i32) {
        *i += d * em.x;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn area() -> VoxelArea {
        VoxelArea::new(IVec3::new(-2, 0, 4), IVec3::new(5, 7, 9))
    }

    #[test]
    fn test_extent_and_volume() {
        let a = area();
        assert_eq!(a.extent(), IVec3::new(8, 8, 6));
        assert_eq!(a.volume(), 8 * 8 * 6);
    }

    #[test]
    fn test_index_is_row_major_x_fastest() {
        let a = area();
        assert_eq!(a.index_p(a.min_edge), 0);
        assert_eq!(a.index(-1, 0, 4), 1);
        assert_eq!(a.index(-2, 1, 4), 8);
        assert_eq!(a.index(-2, 0, 5), 64);
        assert_eq!(a.index_p(a.max_edge), a.volume() - 1);
    }

    #[test]
    fn test_add_y_matches_reindexing() {
        let a = area();
        let em = a.extent();
        let mut i = a.index(1, 3, 6);
        VoxelArea::add_y(em, &mut i, 1);
        assert_eq!(i, a.index(1, 4, 6));
        VoxelArea::add_y(em, &mut i, -3);
        assert_eq!(i, a.index(1, 1, 6));
    }

    #[test]
    fn test_contains_index_rejects_out_of_box() {
        let a = area();
        assert!(a.contains_index(0));
        assert!(a.contains_index(a.volume() - 1));
        assert!(!a.contains_index(-1));
        assert!(!a.contains_index(a.volume()));
    }

    #[test]
    fn test_contains_position() {
        let a = area();
        assert!(a.contains(IVec3::new(0, 0, 4)));
        assert!(!a.contains(IVec3::new(0, -1, 4)));
        assert!(!a.contains(IVec3::new(6, 0, 4)));
    }
}
