//! Procedural voxel-world generation core.
//!
//! Given a world seed and a cuboid of voxel coordinates, this crate fills
//! the cuboid with deterministic ore clusters, scattered surface
//! decorations, and placed block-pattern templates (schematics), then
//! recomputes the heightmap, queues liquid transitions, and computes the
//! block-light field over the result. Terrain shaping and biome selection
//! belong to the generator variants driving this crate; they hand every
//! configured ore and decoration a `(buffer, seed, blockseed, nmin, nmax)`
//! tuple once per generated chunk.

pub mod decoration;
pub mod flags;
pub mod mapgen;
pub mod ore;
pub mod params;
pub mod perlin;
pub mod prng;
pub mod schematic;

pub use decoration::{DecoKind, Decoration, SchematicDeco, SimpleDeco};
pub use mapgen::Mapgen;
pub use ore::{Ore, OreKind};
pub use params::{MapgenV6Params, MapgenV7Params};
pub use perlin::{NoiseMap, NoiseParams};
pub use prng::{PseudoRandom, rand_range, reseed_global};
pub use schematic::{Schematic, SchematicError};
