//! Voxel storage model: cell records, axis-aligned areas with linear index
//! arithmetic, flat generation buffers, block-aligned sparse world storage,
//! and the node-definition registry.

pub mod area;
pub mod buffer;
pub mod cell;
pub mod map;
pub mod registry;

pub use area::VoxelArea;
pub use buffer::VoxelBuffer;
pub use cell::{AIR, ContentId, IGNORE, LIGHT_SUN, MAP_BLOCKSIZE, VoxelCell};
pub use map::{VoxelMap, block_pos};
pub use registry::{NodeDef, NodeRegistry, RegistryError};
