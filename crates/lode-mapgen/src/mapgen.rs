//! Mapgen base utilities shared by the placement engines: ground-level
//! scans, heightmap recompute, liquid-transition collection, sunlight
//! casting, and recursive light diffusion.

use std::collections::VecDeque;

use glam::IVec3;

use lode_log::ScopeTimer;
use lode_voxel::{IGNORE, LIGHT_SUN, NodeRegistry, VoxelArea, VoxelBuffer, VoxelCell};

/// Per-chunk generation state.
///
/// The voxel buffer is exclusively borrowed for the duration of a chunk's
/// generation; its area must cover the chunk plus the margins the
/// placement engines reach into (decorations write up to one block above
/// the chunk top). `heightmap` and `biomemap`, when present, are sized to
/// one entry per chunk column in row-major `(z, x)` order.
pub struct Mapgen<'a> {
    pub seed: u64,
    pub water_level: i32,
    pub vm: &'a mut VoxelBuffer,
    pub ndef: &'a NodeRegistry,
    pub heightmap: Option<Vec<i32>>,
    pub biomemap: Option<Vec<u8>>,
}

impl<'a> Mapgen<'a> {
    pub fn new(seed: u64, water_level: i32, vm: &'a mut VoxelBuffer, ndef: &'a NodeRegistry) -> Self {
        Self {
            seed,
            water_level,
            vm,
            ndef,
            heightmap: None,
            biomemap: None,
        }
    }

    /// Topmost walkable y of the column over the whole buffer height, or
    /// one under the buffer minimum when the column has none.
    pub fn find_ground_level_full(&self, p2d: (i32, i32)) -> i32 {
        let area = self.vm.area;
        self.find_ground_level(p2d, area.min_edge.y, area.max_edge.y)
    }

    /// Topmost walkable y of the column within `[ymin, ymax]`, or
    /// `ymin - 1` when the column has none. The column must lie inside the
    /// buffer.
    pub fn find_ground_level(&self, p2d: (i32, i32), ymin: i32, ymax: i32) -> i32 {
        let em = self.vm.area.extent();
        let mut i = self.vm.area.index(p2d.0, ymax, p2d.1);
        let mut y = ymax;
        while y >= ymin {
            let cell = self.vm.data[i as usize];
            if self.ndef.get(cell.content).walkable {
                return y;
            }
            VoxelArea::add_y(em, &mut i, -1);
            y -= 1;
        }
        ymin - 1
    }

    /// Refills the heightmap from column scans over `[nmin, nmax]`.
    /// Does nothing when no heightmap is attached.
    pub fn update_heightmap(&mut self, nmin: IVec3, nmax: IVec3) {
        let Some(mut heightmap) = self.heightmap.take() else {
            return;
        };
        let mut index = 0;
        for z in nmin.z..=nmax.z {
            for x in nmin.x..=nmax.x {
                heightmap[index] = self.find_ground_level((x, z), nmin.y, nmax.y);
                index += 1;
            }
        }
        self.heightmap = Some(heightmap);
    }

    /// Scans every column top-down and pushes one coordinate per
    /// liquid/non-liquid transition onto the queue.
    ///
    /// Each column starts in the "was liquid" state, so the topmost cell is
    /// reported exactly when it is non-liquid.
    pub fn update_liquid(&self, trans_liquid: &mut VecDeque<IVec3>, nmin: IVec3, nmax: IVec3) {
        let em = self.vm.area.extent();
        for z in nmin.z..=nmax.z {
            for x in nmin.x..=nmax.x {
                let mut wasliquid = true;
                let mut i = self.vm.area.index(x, nmax.y, z);
                for y in (nmin.y..=nmax.y).rev() {
                    let isliquid = self.ndef.get(self.vm.data[i as usize].content).liquid;
                    if isliquid != wasliquid {
                        trans_liquid.push_back(IVec3::new(x, y, z));
                    }
                    wasliquid = isliquid;
                    VoxelArea::add_y(em, &mut i, -1);
                }
            }
        }
    }

    /// Assigns `param1 = light` to every cell in the box.
    pub fn set_lighting(&mut self, nmin: IVec3, nmax: IVec3, light: u8) {
        let _sp = ScopeTimer::new("mapgen: lighting fill");
        let a = VoxelArea::new(nmin, nmax);
        for z in a.min_edge.z..=a.max_edge.z {
            for y in a.min_edge.y..=a.max_edge.y {
                let mut i = self.vm.area.index(a.min_edge.x, y, z) as usize;
                for _x in a.min_edge.x..=a.max_edge.x {
                    self.vm.data[i].param1 = light;
                    i += 1;
                }
            }
        }
    }

    /// Diffuses a light level into `p` and onward through its six axial
    /// neighbours, staying inside `a`.
    ///
    /// Recursion depth is bounded by the light level (at most 15); the
    /// monotone `param1` guard terminates every branch.
    pub fn light_spread(&mut self, a: VoxelArea, p: IVec3, mut light: u8) {
        if light <= 1 || !a.contains(p) {
            return;
        }

        let vi = self.vm.area.index_p(p) as usize;
        let cell = self.vm.data[vi];

        light -= 1;
        // param1 is compared as a whole byte; only the low nibble is in use
        // on this path.
        if light <= cell.param1 || !self.ndef.get(cell.content).light_propagates {
            return;
        }

        self.vm.data[vi].param1 = light;

        self.light_spread(a, p + IVec3::new(0, 0, 1), light);
        self.light_spread(a, p + IVec3::new(0, 1, 0), light);
        self.light_spread(a, p + IVec3::new(1, 0, 0), light);
        self.light_spread(a, p - IVec3::new(0, 0, 1), light);
        self.light_spread(a, p - IVec3::new(0, 1, 0), light);
        self.light_spread(a, p - IVec3::new(1, 0, 0), light);
    }

    /// Computes lighting over `[nmin, nmax]` in two phases: a vertical
    /// sunlight cast per column, then flood-fill diffusion from every lit
    /// cell and light source.
    ///
    /// The cast borrows light from the cell one above the box; an
    /// out-of-buffer read counts as IGNORE. Light levels only ever
    /// increase here.
    pub fn calc_lighting(&mut self, nmin: IVec3, nmax: IVec3) {
        let _sp = ScopeTimer::new("mapgen: lighting update");
        let a = VoxelArea::new(nmin, nmax);
        let block_is_underground = self.water_level >= nmax.y;
        let em = self.vm.area.extent();

        // First, send vertical rays of sunshine downward.
        for z in a.min_edge.z..=a.max_edge.z {
            for x in a.min_edge.x..=a.max_edge.x {
                // See if a light value arrives from over the top.
                let p_above = IVec3::new(x, a.max_edge.y + 1, z);
                let above = if self.vm.area.contains(p_above) {
                    self.vm.data[self.vm.area.index_p(p_above) as usize]
                } else {
                    VoxelCell::new(IGNORE)
                };
                if above.content == IGNORE {
                    if block_is_underground {
                        continue;
                    }
                } else if above.param1 & 0x0F != LIGHT_SUN {
                    continue;
                }

                let mut i = self.vm.area.index(x, a.max_edge.y, z);
                for _y in (a.min_edge.y..=a.max_edge.y).rev() {
                    let cell = self.vm.data[i as usize];
                    if !self.ndef.get(cell.content).sunlight_propagates {
                        break;
                    }
                    self.vm.data[i as usize].param1 = LIGHT_SUN;
                    VoxelArea::add_y(em, &mut i, -1);
                }
            }
        }

        // Now spread the sunlight and light up any sources.
        for z in a.min_edge.z..=a.max_edge.z {
            for y in a.min_edge.y..=a.max_edge.y {
                let mut i = self.vm.area.index(a.min_edge.x, y, z) as usize;
                for x in a.min_edge.x..=a.max_edge.x {
                    let cell = self.vm.data[i];
                    let def = self.ndef.get(cell.content);
                    if cell.content == IGNORE || !def.light_propagates {
                        i += 1;
                        continue;
                    }

                    let light_produced = def.light_source & 0x0F;
                    if light_produced > cell.param1 & 0x0F {
                        self.vm.data[i].param1 = (cell.param1 & 0xF0) | light_produced;
                    }

                    let light = self.vm.data[i].param1 & 0x0F;
                    if light != 0 {
                        self.light_spread(a, IVec3::new(x, y, z + 1), light);
                        self.light_spread(a, IVec3::new(x, y + 1, z), light);
                        self.light_spread(a, IVec3::new(x + 1, y, z), light);
                        self.light_spread(a, IVec3::new(x, y, z - 1), light);
                        self.light_spread(a, IVec3::new(x, y - 1, z), light);
                        self.light_spread(a, IVec3::new(x - 1, y, z), light);
                    }
                    i += 1;
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
