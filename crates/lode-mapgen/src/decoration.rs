//! Surface decoration placement.
//!
//! A decoration rule scatters small structures over the terrain surface of
//! a generated chunk. The chunk's footprint is subdivided into a grid of
//! `sidelen`-sized cells; each cell gets a placement count from either a
//! 2D noise channel sampled at the cell centre or a flat fill ratio, and
//! each placement picks a random column, looks up the ground level, and
//! hands the spot to the rule's variant: a stacked column of nodes
//! ([`SimpleDeco`]) or a block-pattern template ([`SchematicDeco`]).
//!
//! Decorations that would overrun more than one block above the chunk top
//! are dropped, not stitched into the next chunk.

use glam::IVec3;
use hashbrown::HashSet;
use tracing::{error, warn};

use lode_voxel::{
    AIR, ContentId, IGNORE, MAP_BLOCKSIZE, NodeRegistry, VoxelArea, VoxelCell, VoxelMap, block_pos,
};

use crate::flags::{DECO_PLACE_CENTER_X, DECO_PLACE_CENTER_Y, DECO_PLACE_CENTER_Z};
use crate::mapgen::Mapgen;
use crate::perlin::{NoiseParams, perlin_2d};
use crate::prng::{PseudoRandom, rand_range};
use crate::schematic::Schematic;

/// Placement variant of a decoration rule.
pub enum DecoKind {
    Simple(SimpleDeco),
    Schematic(SchematicDeco),
}

/// One configured decoration rule.
pub struct Decoration {
    pub place_on_name: String,
    /// Resolved surface id the rule anchors on; IGNORE disables the check.
    pub c_place_on: ContentId,
    /// Seed for the placement-count noise channel.
    pub mapseed: u64,
    /// Placement-count noise; when absent, `fill_ratio` is used instead.
    pub np: Option<NoiseParams>,
    pub fill_ratio: f32,
    /// Grid cell edge length. Must divide the chunk width; rewritten to the
    /// full width (with a logged warning) when it does not.
    pub sidelen: i32,
    /// Biome ids this rule is limited to; empty means no restriction.
    pub biomes: HashSet<u8>,
    pub kind: DecoKind,
}

/// Stacked column of nodes: flowers, grass tufts, cacti, papyrus.
pub struct SimpleDeco {
    pub deco_name: String,
    pub decolist_names: Vec<String>,
    pub spawnby_name: String,
    pub c_deco: ContentId,
    /// When non-empty, each placement picks uniformly from this list
    /// instead of `c_deco`.
    pub c_decolist: Vec<ContentId>,
    pub c_spawnby: ContentId,
    /// Required number of `c_spawnby` cells among the eight horizontal
    /// neighbours of the anchor; -1 disables the check.
    pub nspawnby: i32,
    pub deco_height: i32,
    /// Upper bound for a randomised height; 0 means the height is fixed.
    pub deco_height_max: i32,
}

/// Block-pattern template placement.
pub struct SchematicDeco {
    /// PLACE_CENTER_{X,Y,Z} flags.
    pub flags: u32,
    /// Source name, for logging (typically the schematic file path).
    pub name: String,
    pub schematic: Schematic,
}

impl Decoration {
    pub fn new(place_on_name: &str, kind: DecoKind) -> Self {
        Self {
            place_on_name: place_on_name.to_string(),
            c_place_on: IGNORE,
            mapseed: 0,
            np: None,
            fill_ratio: 0.0,
            sidelen: 1,
            biomes: HashSet::new(),
            kind,
        }
    }

    /// One-shot id resolution; must complete before any placement call.
    pub fn resolve_node_names(&mut self, ndef: &NodeRegistry) {
        if self.c_place_on == IGNORE {
            self.c_place_on = ndef.get_id(&self.place_on_name);
        }
        match &mut self.kind {
            DecoKind::Simple(simple) => simple.resolve_node_names(ndef),
            DecoKind::Schematic(schematic) => schematic.schematic.resolve_node_names(ndef),
        }
    }

    /// Declared height of one placement, used for the chunk-top cutoff.
    pub fn get_height(&self) -> i32 {
        match &self.kind {
            DecoKind::Simple(simple) => {
                if simple.deco_height_max > 0 {
                    simple.deco_height_max
                } else {
                    simple.deco_height
                }
            }
            DecoKind::Schematic(schematic) => schematic.schematic.size.y,
        }
    }

    pub fn get_name(&self) -> &str {
        match &self.kind {
            DecoKind::Simple(simple) => &simple.deco_name,
            DecoKind::Schematic(schematic) => &schematic.name,
        }
    }

    /// Runs the grid placement driver over the chunk `[nmin, nmax]`.
    pub fn place_deco(&mut self, mg: &mut Mapgen, blockseed: u32, nmin: IVec3, nmax: IVec3) {
        let mut ps = PseudoRandom::new(blockseed.wrapping_add(53));
        let carea_size = nmax.x - nmin.x + 1;

        if self.sidelen <= 0 || carea_size % self.sidelen != 0 {
            warn!(
                deco = %self.get_name(),
                sidelen = self.sidelen,
                "chunk size is not divisible by sidelen; setting sidelen to {carea_size}"
            );
            self.sidelen = carea_size;
        }
        let sidelen = self.sidelen;
        let divlen = carea_size / sidelen;
        let area = sidelen * sidelen;

        for z0 in 0..divlen {
            for x0 in 0..divlen {
                // Centre and bounds of this part of the division.
                let center_x = nmin.x + sidelen / 2 + sidelen * x0;
                let center_z = nmin.z + sidelen / 2 + sidelen * z0;
                let min_x = nmin.x + sidelen * x0;
                let min_z = nmin.z + sidelen * z0;
                let max_x = nmin.x + sidelen + sidelen * x0 - 1;
                let max_z = nmin.z + sidelen + sidelen * z0 - 1;

                let nval = match &self.np {
                    Some(np) => perlin_2d(np, center_x as f64, center_z as f64, self.mapseed),
                    None => self.fill_ratio,
                };
                let deco_count = (area as f32 * nval.max(0.0)) as u32;

                for _ in 0..deco_count {
                    let x = ps.range(min_x, max_x);
                    let z = ps.range(min_z, max_z);

                    let mapindex = (carea_size * (z - nmin.z) + (x - nmin.x)) as usize;
                    let y = match &mg.heightmap {
                        Some(heightmap) => heightmap[mapindex],
                        None => mg.find_ground_level((x, z), nmin.y, nmax.y),
                    };
                    if y < nmin.y || y > nmax.y {
                        continue;
                    }

                    let height = self.get_height();
                    let max_y = nmax.y + MAP_BLOCKSIZE;
                    if y + 1 + height > max_y {
                        // Would overrun into the next chunk: dropped.
                        continue;
                    }

                    if let Some(biomemap) = &mg.biomemap {
                        if !self.biomes.is_empty() && !self.biomes.contains(&biomemap[mapindex]) {
                            continue;
                        }
                    }

                    self.generate_at(mg, &mut ps, max_y, IVec3::new(x, y, z));
                }
            }
        }
    }

    fn generate_at(&self, mg: &mut Mapgen, pr: &mut PseudoRandom, max_y: i32, p: IVec3) {
        match &self.kind {
            DecoKind::Simple(simple) => simple.generate(mg, pr, self.c_place_on, max_y, p),
            DecoKind::Schematic(schematic) => schematic.generate(mg, self.c_place_on, p),
        }
    }
}

// ---------------------------------------------------------------------------
// Simple decorations
// ---------------------------------------------------------------------------

/// The eight horizontal neighbour offsets, in the fixed traversal order
/// the spawn-by check uses.
const MOORE_DIRS: [IVec3; 8] = [
    IVec3::new(0, 0, 1),
    IVec3::new(0, 0, -1),
    IVec3::new(1, 0, 0),
    IVec3::new(-1, 0, 0),
    IVec3::new(1, 0, 1),
    IVec3::new(-1, 0, 1),
    IVec3::new(-1, 0, -1),
    IVec3::new(1, 0, -1),
];

impl SimpleDeco {
    pub fn new(deco_name: &str) -> Self {
        Self {
            deco_name: deco_name.to_string(),
            decolist_names: Vec::new(),
            spawnby_name: String::new(),
            c_deco: IGNORE,
            c_decolist: Vec::new(),
            c_spawnby: IGNORE,
            nspawnby: -1,
            deco_height: 1,
            deco_height_max: 0,
        }
    }

    fn resolve_node_names(&mut self, ndef: &NodeRegistry) {
        if self.c_deco == IGNORE {
            self.c_deco = ndef.get_id(&self.deco_name);
            if self.c_deco == IGNORE {
                error!(node = %self.deco_name, "decoration node not defined");
                self.c_deco = AIR;
            }
        }
        if self.nspawnby >= 0 && self.c_spawnby == IGNORE {
            self.c_spawnby = ndef.get_id(&self.spawnby_name);
            if self.c_spawnby == IGNORE {
                error!(node = %self.spawnby_name, "spawn-by node not defined");
                self.nspawnby = -1;
                self.c_spawnby = AIR;
            }
        }

        if !self.c_decolist.is_empty() {
            return;
        }
        for name in &self.decolist_names {
            let mut c = ndef.get_id(name);
            if c == IGNORE {
                error!(node = %name, "decoration list node not defined");
                c = AIR;
            }
            self.c_decolist.push(c);
        }
    }

    /// Places one stacked column at `p`. The anchor cell itself is never
    /// written; the column starts one above it and stops at the first cell
    /// that is neither air nor unknown.
    fn generate(
        &self,
        mg: &mut Mapgen,
        pr: &mut PseudoRandom,
        c_place_on: ContentId,
        max_y: i32,
        p: IVec3,
    ) {
        let area = mg.vm.area;
        let vi = area.index_p(p);
        if !area.contains_index(vi) {
            return;
        }
        if mg.vm.data[vi as usize].content != c_place_on && c_place_on != IGNORE {
            return;
        }

        if self.nspawnby != -1 {
            let mut nneighs = 0;
            for dir in MOORE_DIRS {
                let i = area.index_p(p + dir);
                if area.contains_index(i) && mg.vm.data[i as usize].content == self.c_spawnby {
                    nneighs += 1;
                }
            }
            if nneighs < self.nspawnby {
                return;
            }
        }

        let c_place = if self.c_decolist.is_empty() {
            self.c_deco
        } else {
            self.c_decolist[pr.range(0, self.c_decolist.len() as i32 - 1) as usize]
        };

        let mut height = if self.deco_height_max > 0 {
            pr.range(self.deco_height, self.deco_height_max)
        } else {
            self.deco_height
        };
        height = height.min(max_y - p.y);

        let em = area.extent();
        let mut vi = vi;
        for _ in 0..height {
            VoxelArea::add_y(em, &mut vi, 1);
            if !area.contains_index(vi) {
                break;
            }
            let c = mg.vm.data[vi as usize].content;
            if c != AIR && c != IGNORE {
                break;
            }
            mg.vm.data[vi as usize] = VoxelCell::new(c_place);
        }
    }
}

// ---------------------------------------------------------------------------
// Schematic decorations
// ---------------------------------------------------------------------------

impl SchematicDeco {
    /// Anchor position shifted by the PLACE_CENTER flags.
    fn centered(&self, mut p: IVec3) -> IVec3 {
        let size = self.schematic.size;
        if self.flags & DECO_PLACE_CENTER_X != 0 {
            p.x -= (size.x + 1) / 2;
        }
        if self.flags & DECO_PLACE_CENTER_Y != 0 {
            p.y -= (size.y + 1) / 2;
        }
        if self.flags & DECO_PLACE_CENTER_Z != 0 {
            p.z -= (size.z + 1) / 2;
        }
        p
    }

    /// Places the template at `p` during chunk generation. Only cells that
    /// are currently air or unknown are written, each subject to the
    /// template's probability mask.
    fn generate(&self, mg: &mut Mapgen, c_place_on: ContentId, p: IVec3) {
        let p = self.centered(p);
        let size = self.schematic.size;
        let area = mg.vm.area;

        let vi = area.index_p(p);
        if !area.contains_index(vi) {
            return;
        }
        if mg.vm.data[vi as usize].content != c_place_on && c_place_on != IGNORE {
            return;
        }

        let mut i = 0usize;
        for z in 0..size.z {
            for y in 0..size.y {
                let mut vi = area.index(p.x, p.y + y, p.z + z);
                for _x in 0..size.x {
                    if area.contains_index(vi) {
                        let c = mg.vm.data[vi as usize].content;
                        if c == AIR || c == IGNORE {
                            let cell = self.schematic.cells[i];
                            if cell.param1 == 0 || rand_range(1, 256) <= cell.param1 as i32 {
                                mg.vm.data[vi as usize] = cell;
                                mg.vm.data[vi as usize].param1 = 0;
                            }
                        }
                    }
                    i += 1;
                    vi += 1;
                }
            }
        }
    }

    /// Stand-alone placement into a map, outside chunk generation.
    ///
    /// Emerges the block-aligned region covering the template (plus one
    /// block above, so the sunlight cast can borrow light from the top),
    /// writes every template cell unconditionally subject to the
    /// probability mask, recomputes lighting over the modified region, and
    /// blits the result back.
    pub fn place_structure(&self, map: &mut VoxelMap, p: IVec3, ndef: &NodeRegistry) {
        let p = self.centered(p);
        let size = self.schematic.size;

        let bp1 = block_pos(p);
        let bp2 = block_pos(p + size - IVec3::ONE);
        let node_min = bp1 * MAP_BLOCKSIZE;
        let node_max = (bp2 + IVec3::ONE) * MAP_BLOCKSIZE - IVec3::ONE;
        let emerge_area =
            VoxelArea::new(node_min, node_max + IVec3::new(0, MAP_BLOCKSIZE, 0));

        let mut vm = map.read_area(emerge_area);

        let mut i = 0usize;
        for z in 0..size.z {
            for y in 0..size.y {
                let mut vi = vm.area.index(p.x, p.y + y, p.z + z);
                for _x in 0..size.x {
                    if vm.area.contains_index(vi) {
                        let cell = self.schematic.cells[i];
                        if cell.param1 == 0 || rand_range(1, 256) <= cell.param1 as i32 {
                            vm.data[vi as usize] = cell;
                            vm.data[vi as usize].param1 = 0;
                        }
                    }
                    i += 1;
                    vi += 1;
                }
            }
        }

        // A hand-placed structure is never treated as underground.
        let mut mg = Mapgen::new(0, i32::MIN, &mut vm, ndef);
        mg.calc_lighting(node_min, node_max);

        map.blit_back(&vm);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
