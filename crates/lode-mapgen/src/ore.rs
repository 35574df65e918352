//! Ore placement: scatter and sheet distributions over host rock.
//!
//! An ore rule rewrites cells of one kind (`wherein`) into another (`ore`)
//! according to a statistical distribution, gated by a vertical range that
//! can optionally mirror below zero. Rules are configured at load time,
//! resolved once against the node registry, and invoked once per generated
//! chunk with that chunk's `blockseed`.

use glam::IVec3;
use tracing::{error, warn};

use lode_voxel::{AIR, ContentId, IGNORE, NodeRegistry, VoxelBuffer, VoxelCell};

use crate::flags::OREFLAG_ABSHEIGHT;
use crate::mapgen::Mapgen;
use crate::perlin::{NoiseMap, NoiseParams, perlin_3d};
use crate::prng::PseudoRandom;

/// Distribution variant of an ore rule.
pub enum OreKind {
    /// Independent small clusters, uniformly scattered through the volume.
    Scatter,
    /// Horizontal sheets following a 2D noise footprint.
    Sheet,
}

/// One configured ore rule.
///
/// `clust_num_ores` must not exceed `clust_size` cubed, and
/// `clust_scarcity` must be positive; a violating rule logs a warning and
/// places nothing.
pub struct Ore {
    pub kind: OreKind,
    pub ore_name: String,
    pub wherein_name: String,
    /// Resolved target id; IGNORE until [`Ore::resolve_node_names`] runs.
    pub ore: ContentId,
    /// Resolved host id; IGNORE until resolved.
    pub wherein: ContentId,
    /// One cluster per this many cells of chunk volume.
    pub clust_scarcity: i32,
    /// Cells written per cluster, on average.
    pub clust_num_ores: i32,
    /// Cluster cube edge length (scatter) or sheet thickness (sheet).
    pub clust_size: i32,
    pub height_min: i32,
    pub height_max: i32,
    pub flags: u32,
    /// Noise gate threshold; used when `np` is set (scatter) and always by
    /// sheets.
    pub nthresh: f32,
    pub np: Option<NoiseParams>,
    /// param2 byte written into placed ore cells.
    pub ore_param2: u8,
}

impl Ore {
    pub fn new(kind: OreKind, ore_name: &str, wherein_name: &str) -> Self {
        Self {
            kind,
            ore_name: ore_name.to_string(),
            wherein_name: wherein_name.to_string(),
            ore: IGNORE,
            wherein: IGNORE,
            clust_scarcity: 1,
            clust_num_ores: 1,
            clust_size: 1,
            height_min: i32::MIN / 2,
            height_max: i32::MAX / 2,
            flags: 0,
            nthresh: 0.0,
            np: None,
            ore_param2: 0,
        }
    }

    /// One-shot id resolution; must complete before any placement call.
    /// An unresolvable name disables the rule by degrading both ids to AIR.
    pub fn resolve_node_names(&mut self, ndef: &NodeRegistry) {
        if self.ore == IGNORE {
            self.ore = ndef.get_id(&self.ore_name);
            if self.ore == IGNORE {
                error!(node = %self.ore_name, "ore node not defined");
                self.ore = AIR;
                self.wherein = AIR;
            }
        }
        if self.wherein == IGNORE {
            self.wherein = ndef.get_id(&self.wherein_name);
            if self.wherein == IGNORE {
                error!(node = %self.wherein_name, "ore wherein node not defined");
                self.ore = AIR;
                self.wherein = AIR;
            }
        }
    }

    /// Places this rule into the chunk `[nmin, nmax]`.
    ///
    /// The chunk's y range is intersected with the configured vertical
    /// range; with the ABSHEIGHT flag the mirrored range
    /// `[-height_max, -height_min]` is also tested and, when it matches,
    /// takes precedence over the normal range. A clamped range with no
    /// vertical room for a cluster places nothing.
    pub fn place_ore(&self, mg: &mut Mapgen, blockseed: u32, nmin: IVec3, nmax: IVec3) {
        let mut in_range = 0;
        if nmin.y <= self.height_max && nmax.y >= self.height_min {
            in_range |= 1;
        }
        if self.flags & OREFLAG_ABSHEIGHT != 0
            && nmin.y <= -self.height_min
            && nmax.y >= -self.height_max
        {
            in_range |= 2;
        }
        if in_range == 0 {
            return;
        }

        let (ymin, ymax) = if in_range & 2 != 0 {
            (nmin.y.max(-self.height_max), nmax.y.min(-self.height_min))
        } else {
            (nmin.y.max(self.height_min), nmax.y.min(self.height_max))
        };
        if self.clust_size >= ymax - ymin + 1 {
            return;
        }

        let nmin = IVec3::new(nmin.x, ymin, nmin.z);
        let nmax = IVec3::new(nmax.x, ymax, nmax.z);
        match self.kind {
            OreKind::Scatter => self.generate_scatter(mg.vm, mg.seed, blockseed, nmin, nmax),
            OreKind::Sheet => self.generate_sheet(mg.vm, mg.seed, blockseed, nmin, nmax),
        }
    }

    fn generate_scatter(
        &self,
        vm: &mut VoxelBuffer,
        seed: u64,
        blockseed: u32,
        nmin: IVec3,
        nmax: IVec3,
    ) {
        let mut pr = PseudoRandom::new(blockseed);
        let n_ore = VoxelCell::with_params(self.ore, 0, self.ore_param2);

        let volume = (nmax.x - nmin.x + 1) * (nmax.y - nmin.y + 1) * (nmax.z - nmin.z + 1);
        let csize = self.clust_size;
        let orechance = csize * csize * csize / self.clust_num_ores;
        if self.clust_scarcity <= 0 || orechance == 0 {
            warn!(ore = %self.ore_name, "unsatisfiable cluster configuration; skipping");
            return;
        }
        if csize > nmax.x - nmin.x + 1 || csize > nmax.z - nmin.z + 1 {
            return;
        }
        let nclusters = volume / self.clust_scarcity;

        for _ in 0..nclusters {
            let x0 = pr.range(nmin.x, nmax.x - csize + 1);
            let y0 = pr.range(nmin.y, nmax.y - csize + 1);
            let z0 = pr.range(nmin.z, nmax.z - csize + 1);

            if self
                .np
                .as_ref()
                .is_some_and(|np| perlin_3d(np, x0 as f64, y0 as f64, z0 as f64, seed) < self.nthresh)
            {
                continue;
            }

            for z1 in 0..csize {
                for y1 in 0..csize {
                    for x1 in 0..csize {
                        if pr.range(1, orechance) != 1 {
                            continue;
                        }
                        let i = vm.area.index(x0 + x1, y0 + y1, z0 + z1) as usize;
                        if vm.data[i].content == self.wherein {
                            vm.data[i] = n_ore;
                        }
                    }
                }
            }
        }
    }

    fn generate_sheet(
        &self,
        vm: &mut VoxelBuffer,
        seed: u64,
        blockseed: u32,
        nmin: IVec3,
        nmax: IVec3,
    ) {
        let mut pr = PseudoRandom::new(blockseed.wrapping_add(4234));
        let n_ore = VoxelCell::with_params(self.ore, 0, self.ore_param2);

        let max_height = self.clust_size;
        let y_start = pr.range(nmin.y, nmax.y - max_height);

        let Some(np) = &self.np else {
            warn!(ore = %self.ore_name, "sheet ore without a noise block; skipping");
            return;
        };

        let sx = (nmax.x - nmin.x + 1) as usize;
        let sz = (nmax.z - nmin.z + 1) as usize;
        let mut noise = NoiseMap::new(np.clone(), sx, sz);
        noise.fill(nmin.x, nmin.z, seed.wrapping_add_signed(y_start as i64));

        let mut index = 0;
        for z in nmin.z..=nmax.z {
            for x in nmin.x..=nmax.x {
                let noiseval = noise.result[index];
                index += 1;
                if noiseval < self.nthresh {
                    continue;
                }

                let height = (max_height as f32 * (1.0 / pr.range(1, 3) as f32)) as i32;
                let y0 = (y_start as f32 + np.scale * noiseval) as i32;
                let y1 = y0 + height;
                for y in y0..y1 {
                    let i = vm.area.index(x, y, z);
                    if !vm.area.contains_index(i) {
                        continue;
                    }
                    let i = i as usize;
                    if vm.data[i].content == self.wherein {
                        vm.data[i] = n_ore;
                    }
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapgen::tests::{STONE, test_registry};
    use glam::Vec3;
    use lode_voxel::VoxelArea;

    const ORE_ID: ContentId = ContentId(4);

    fn registry_with_ore() -> NodeRegistry {
        let mut reg = test_registry();
        let id = reg
            .register(lode_voxel::NodeDef {
                name: "iron_ore".to_string(),
                walkable: true,
                light_propagates: false,
                sunlight_propagates: false,
                liquid: false,
                light_source: 0,
            })
            .unwrap();
        assert_eq!(id, ORE_ID);
        reg
    }

    fn stone_chunk() -> VoxelBuffer {
        VoxelBuffer::filled(
            VoxelArea::new(IVec3::ZERO, IVec3::splat(15)),
            VoxelCell::new(STONE),
        )
    }

    fn scatter_ore() -> Ore {
        let mut ore = Ore::new(OreKind::Scatter, "iron_ore", "stone");
        ore.clust_scarcity = 8;
        ore.clust_num_ores = 8;
        ore.clust_size = 2;
        ore.height_min = -1000;
        ore.height_max = 1000;
        ore
    }

    fn count_ore(buf: &VoxelBuffer) -> usize {
        buf.data.iter().filter(|c| c.content == ORE_ID).count()
    }

    #[test]
    fn test_scatter_is_deterministic() {
        let reg = registry_with_ore();
        let mut ore = scatter_ore();
        ore.resolve_node_names(&reg);

        let mut buf_a = stone_chunk();
        let mut buf_b = stone_chunk();
        {
            let mut mg = Mapgen::new(42, 1, &mut buf_a, &reg);
            ore.place_ore(&mut mg, 1, IVec3::ZERO, IVec3::splat(15));
        }
        {
            let mut mg = Mapgen::new(42, 1, &mut buf_b, &reg);
            ore.place_ore(&mut mg, 1, IVec3::ZERO, IVec3::splat(15));
        }

        assert!(count_ore(&buf_a) > 0, "this configuration must place ore");
        assert_eq!(buf_a.data, buf_b.data, "two runs must be byte-identical");
    }

    #[test]
    fn test_scatter_only_replaces_host_rock() {
        let reg = registry_with_ore();
        let mut ore = scatter_ore();
        ore.resolve_node_names(&reg);

        let mut buf = stone_chunk();
        // Carve an air pocket; no ore may appear there.
        for x in 4..12 {
            for y in 4..12 {
                for z in 4..12 {
                    buf.set(IVec3::new(x, y, z), VoxelCell::new(AIR));
                }
            }
        }
        let before = buf.data.clone();
        {
            let mut mg = Mapgen::new(42, 1, &mut buf, &reg);
            ore.place_ore(&mut mg, 7, IVec3::ZERO, IVec3::splat(15));
        }
        for (i, (old, new)) in before.iter().zip(buf.data.iter()).enumerate() {
            if old != new {
                assert_eq!(old.content, STONE, "non-host cell rewritten at index {i}");
                assert_eq!(new.content, ORE_ID);
            }
        }
    }

    #[test]
    fn test_vertical_range_too_small_for_cluster_is_a_noop() {
        let reg = registry_with_ore();
        let mut ore = scatter_ore();
        // Cluster as tall as the whole clamped range.
        ore.clust_size = 16;
        ore.resolve_node_names(&reg);

        let mut buf = stone_chunk();
        let mut mg = Mapgen::new(42, 1, &mut buf, &reg);
        ore.place_ore(&mut mg, 1, IVec3::ZERO, IVec3::splat(15));
        assert_eq!(count_ore(&buf), 0);
    }

    #[test]
    fn test_chunk_outside_height_range_is_a_noop() {
        let reg = registry_with_ore();
        let mut ore = scatter_ore();
        ore.height_min = 100;
        ore.height_max = 200;
        ore.resolve_node_names(&reg);

        let mut buf = stone_chunk();
        let mut mg = Mapgen::new(42, 1, &mut buf, &reg);
        ore.place_ore(&mut mg, 1, IVec3::ZERO, IVec3::splat(15));
        assert_eq!(count_ore(&buf), 0);
    }

    #[test]
    fn test_absheight_mirrors_the_range() {
        let reg = registry_with_ore();
        let mut ore = scatter_ore();
        ore.height_min = 100;
        ore.height_max = 200;
        ore.resolve_node_names(&reg);

        // Chunk at y in [-200, -185]: only the mirrored range matches.
        let area = VoxelArea::new(IVec3::new(0, -200, 0), IVec3::new(15, -185, 15));
        let nmin = area.min_edge;
        let nmax = area.max_edge;

        let mut buf = VoxelBuffer::filled(area, VoxelCell::new(STONE));
        {
            let mut mg = Mapgen::new(42, 1, &mut buf, &reg);
            ore.place_ore(&mut mg, 1, nmin, nmax);
        }
        assert_eq!(count_ore(&buf), 0, "without ABSHEIGHT nothing is placed");

        ore.flags |= OREFLAG_ABSHEIGHT;
        let mut buf = VoxelBuffer::filled(area, VoxelCell::new(STONE));
        {
            let mut mg = Mapgen::new(42, 1, &mut buf, &reg);
            ore.place_ore(&mut mg, 1, nmin, nmax);
        }
        assert!(count_ore(&buf) > 0, "ABSHEIGHT must mirror the range");
    }

    #[test]
    fn test_scatter_noise_gate_can_suppress_all_clusters() {
        let reg = registry_with_ore();
        let mut ore = scatter_ore();
        // Constant-zero channel below the threshold gates every cluster.
        ore.np = Some(NoiseParams {
            offset: 0.0,
            scale: 0.0,
            spread: Vec3::splat(100.0),
            seed: 0,
            octaves: 3,
            persistence: 0.7,
        });
        ore.nthresh = 0.1;
        ore.resolve_node_names(&reg);

        let mut buf = stone_chunk();
        let mut mg = Mapgen::new(42, 1, &mut buf, &reg);
        ore.place_ore(&mut mg, 1, IVec3::ZERO, IVec3::splat(15));
        assert_eq!(count_ore(&buf), 0);
    }

    #[test]
    fn test_unsatisfiable_cluster_configuration_is_skipped() {
        let reg = registry_with_ore();
        let mut ore = scatter_ore();
        // More ores per cluster than the cluster cube has cells.
        ore.clust_num_ores = 100;
        ore.clust_size = 2;
        ore.resolve_node_names(&reg);

        let mut buf = stone_chunk();
        let mut mg = Mapgen::new(42, 1, &mut buf, &reg);
        ore.place_ore(&mut mg, 1, IVec3::ZERO, IVec3::splat(15));
        assert_eq!(count_ore(&buf), 0);
    }

    #[test]
    fn test_sheet_below_threshold_places_nothing() {
        let reg = registry_with_ore();
        let mut ore = Ore::new(OreKind::Sheet, "iron_ore", "stone");
        ore.clust_size = 4;
        ore.height_min = -1000;
        ore.height_max = 1000;
        ore.nthresh = 0.1;
        ore.np = Some(NoiseParams {
            offset: 0.0,
            scale: 0.0,
            spread: Vec3::splat(100.0),
            seed: 0,
            octaves: 3,
            persistence: 0.7,
        });
        ore.resolve_node_names(&reg);

        let mut buf = stone_chunk();
        let mut mg = Mapgen::new(42, 1, &mut buf, &reg);
        ore.place_ore(&mut mg, 1, IVec3::ZERO, IVec3::splat(15));
        assert_eq!(count_ore(&buf), 0);
    }

    #[test]
    fn test_sheet_above_threshold_covers_every_column() {
        let reg = registry_with_ore();
        let mut ore = Ore::new(OreKind::Sheet, "iron_ore", "stone");
        ore.clust_size = 4;
        ore.height_min = -1000;
        ore.height_max = 1000;
        ore.nthresh = 0.1;
        // Constant 0.5 with zero scale: every column passes the gate and the
        // slab base does not wander.
        ore.np = Some(NoiseParams {
            offset: 0.5,
            scale: 0.0,
            spread: Vec3::splat(100.0),
            seed: 0,
            octaves: 3,
            persistence: 0.7,
        });
        ore.resolve_node_names(&reg);

        let mut buf = stone_chunk();
        {
            let mut mg = Mapgen::new(42, 1, &mut buf, &reg);
            ore.place_ore(&mut mg, 1, IVec3::ZERO, IVec3::splat(15));
        }

        let base = buf
            .data
            .iter()
            .enumerate()
            .filter(|(_, c)| c.content == ORE_ID)
            .map(|(i, _)| (i as i32 / 16) % 16)
            .min()
            .expect("the sheet must place ore");
        for x in 0..16 {
            for z in 0..16 {
                assert_eq!(
                    buf.get(IVec3::new(x, base, z)).content,
                    ORE_ID,
                    "sheet base row missing at ({x}, {z})"
                );
            }
        }
        // Nothing below the base, nothing at or above base + thickness.
        for x in 0..16 {
            for z in 0..16 {
                for y in 0..16 {
                    if y < base || y >= base + 4 {
                        assert_ne!(
                            buf.get(IVec3::new(x, y, z)).content,
                            ORE_ID,
                            "ore outside the slab at ({x}, {y}, {z})"
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn test_unresolved_ore_name_degrades_to_air() {
        let reg = registry_with_ore();
        let mut ore = Ore::new(OreKind::Scatter, "unobtainium", "stone");
        ore.resolve_node_names(&reg);
        assert_eq!(ore.ore, AIR);
        assert_eq!(ore.wherein, AIR);
    }
}
