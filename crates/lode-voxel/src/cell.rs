//! Voxel cell record and content-id sentinels.

use serde::{Deserialize, Serialize};

/// Side length of a map block in voxels.
pub const MAP_BLOCKSIZE: i32 = 16;

/// Sunlight level, carried in the low nibble of `param1`.
pub const LIGHT_SUN: u8 = 15;

/// Compact identifier stored inside every voxel cell (2 bytes).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentId(pub u16);

/// Empty space. The registry pre-registers "air" at id 0.
pub const AIR: ContentId = ContentId(0);

/// Unknown content: outside the loaded region, or a name that failed to
/// resolve.
pub const IGNORE: ContentId = ContentId(u16::MAX);

/// One voxel cell: a content id plus two per-cell parameter bytes.
///
/// In the live world `param1` carries the light level (low nibble). Inside
/// schematic templates the same byte is a 1-255 placement probability, with
/// 0 meaning "always place". `param2` is an orientation or variant byte,
/// opaque to this crate. Equality is on the full record.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VoxelCell {
    pub content: ContentId,
    pub param1: u8,
    pub param2: u8,
}

impl VoxelCell {
    /// A cell of the given content with both parameter bytes zeroed.
    pub const fn new(content: ContentId) -> Self {
        Self {
            content,
            param1: 0,
            param2: 0,
        }
    }

    pub const fn with_params(content: ContentId, param1: u8, param2: u8) -> Self {
        Self {
            content,
            param1,
            param2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equality_covers_the_full_record() {
        let a = VoxelCell::with_params(ContentId(3), 7, 0);
        let b = VoxelCell::with_params(ContentId(3), 8, 0);
        let c = VoxelCell::with_params(ContentId(3), 7, 0);
        assert_ne!(a, b, "cells differing only in param1 must not be equal");
        assert_eq!(a, c);
    }

    #[test]
    fn test_sentinels_are_distinct() {
        assert_ne!(AIR, IGNORE);
    }
}
