//! Generator-variant parameter blocks, read from and written to the
//! settings store.
//!
//! A variant is configured only when every one of its keys reads
//! successfully; a missing or malformed key makes `read_params` return
//! `None` without leaving partial state behind.

use lode_config::Settings;

use crate::perlin::NoiseParams;

/// Noise and frequency parameters of the v6 generator variant.
#[derive(Clone, Debug, PartialEq)]
pub struct MapgenV6Params {
    pub freq_desert: f32,
    pub freq_beach: f32,
    pub np_terrain_base: NoiseParams,
    pub np_terrain_higher: NoiseParams,
    pub np_steepness: NoiseParams,
    pub np_height_select: NoiseParams,
    pub np_mud: NoiseParams,
    pub np_beach: NoiseParams,
    pub np_biome: NoiseParams,
    pub np_cave: NoiseParams,
    pub np_humidity: NoiseParams,
    pub np_trees: NoiseParams,
    pub np_apple_trees: NoiseParams,
}

impl MapgenV6Params {
    pub fn read_params(settings: &Settings) -> Option<Self> {
        Some(Self {
            freq_desert: settings.get_float("mgv6_freq_desert")?,
            freq_beach: settings.get_float("mgv6_freq_beach")?,
            np_terrain_base: settings.get("mgv6_np_terrain_base")?,
            np_terrain_higher: settings.get("mgv6_np_terrain_higher")?,
            np_steepness: settings.get("mgv6_np_steepness")?,
            np_height_select: settings.get("mgv6_np_height_select")?,
            np_mud: settings.get("mgv6_np_mud")?,
            np_beach: settings.get("mgv6_np_beach")?,
            np_biome: settings.get("mgv6_np_biome")?,
            np_cave: settings.get("mgv6_np_cave")?,
            np_humidity: settings.get("mgv6_np_humidity")?,
            np_trees: settings.get("mgv6_np_trees")?,
            np_apple_trees: settings.get("mgv6_np_apple_trees")?,
        })
    }

    pub fn write_params(&self, settings: &mut Settings) {
        settings.set_float("mgv6_freq_desert", self.freq_desert);
        settings.set_float("mgv6_freq_beach", self.freq_beach);
        settings.set("mgv6_np_terrain_base", &self.np_terrain_base);
        settings.set("mgv6_np_terrain_higher", &self.np_terrain_higher);
        settings.set("mgv6_np_steepness", &self.np_steepness);
        settings.set("mgv6_np_height_select", &self.np_height_select);
        settings.set("mgv6_np_mud", &self.np_mud);
        settings.set("mgv6_np_beach", &self.np_beach);
        settings.set("mgv6_np_biome", &self.np_biome);
        settings.set("mgv6_np_cave", &self.np_cave);
        settings.set("mgv6_np_humidity", &self.np_humidity);
        settings.set("mgv6_np_trees", &self.np_trees);
        settings.set("mgv6_np_apple_trees", &self.np_apple_trees);
    }
}

/// Noise parameters of the v7 generator variant.
#[derive(Clone, Debug, PartialEq)]
pub struct MapgenV7Params {
    pub np_terrain_base: NoiseParams,
    pub np_terrain_alt: NoiseParams,
    pub np_terrain_mod: NoiseParams,
    pub np_terrain_persist: NoiseParams,
    pub np_height_select: NoiseParams,
    pub np_ridge: NoiseParams,
}

impl MapgenV7Params {
    pub fn read_params(settings: &Settings) -> Option<Self> {
        Some(Self {
            np_terrain_base: settings.get("mgv7_np_terrain_base")?,
            np_terrain_alt: settings.get("mgv7_np_terrain_alt")?,
            np_terrain_mod: settings.get("mgv7_np_terrain_mod")?,
            np_terrain_persist: settings.get("mgv7_np_terrain_persist")?,
            np_height_select: settings.get("mgv7_np_height_select")?,
            np_ridge: settings.get("mgv7_np_ridge")?,
        })
    }

    pub fn write_params(&self, settings: &mut Settings) {
        settings.set("mgv7_np_terrain_base", &self.np_terrain_base);
        settings.set("mgv7_np_terrain_alt", &self.np_terrain_alt);
        settings.set("mgv7_np_terrain_mod", &self.np_terrain_mod);
        settings.set("mgv7_np_terrain_persist", &self.np_terrain_persist);
        settings.set("mgv7_np_height_select", &self.np_height_select);
        settings.set("mgv7_np_ridge", &self.np_ridge);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    fn np(seed: i32) -> NoiseParams {
        NoiseParams {
            offset: 0.0,
            scale: 1.0,
            spread: Vec3::new(250.0, 250.0, 250.0),
            seed,
            octaves: 5,
            persistence: 0.6,
        }
    }

    fn v7_params() -> MapgenV7Params {
        MapgenV7Params {
            np_terrain_base: np(82341),
            np_terrain_alt: np(5934),
            np_terrain_mod: np(85039),
            np_terrain_persist: np(539),
            np_height_select: np(4213),
            np_ridge: np(6467),
        }
    }

    #[test]
    fn test_v7_write_then_read_round_trips() {
        let mut settings = Settings::new();
        let params = v7_params();
        params.write_params(&mut settings);

        let read = MapgenV7Params::read_params(&settings).expect("all keys were written");
        assert_eq!(read, params);
    }

    #[test]
    fn test_missing_key_fails_the_whole_read() {
        let mut partial = Settings::new();
        v7_params().write_params(&mut partial);
        // Clobber one key with a value that cannot parse as a noise block.
        partial.set("mgv7_np_ridge", &"not a noise block".to_string());

        assert!(
            MapgenV7Params::read_params(&partial).is_none(),
            "a bad key must fail the read with no partial state"
        );
    }

    #[test]
    fn test_v6_requires_the_frequency_floats() {
        let mut settings = Settings::new();
        let params = MapgenV6Params {
            freq_desert: 0.45,
            freq_beach: 0.15,
            np_terrain_base: np(82341),
            np_terrain_higher: np(85039),
            np_steepness: np(-932),
            np_height_select: np(4213),
            np_mud: np(91013),
            np_beach: np(59420),
            np_biome: np(9130),
            np_cave: np(34329),
            np_humidity: np(72384),
            np_trees: np(2),
            np_apple_trees: np(342902),
        };
        params.write_params(&mut settings);
        let read = MapgenV6Params::read_params(&settings).expect("fully written block");
        assert_eq!(read, params);
        assert_eq!(read.freq_desert, 0.45);
    }
}
