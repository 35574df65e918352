//! Fractal Perlin sampling parameterised the way generator configs
//! express it.
//!
//! A [`NoiseParams`] block describes one noise channel: `offset + scale *
//! fbm(point / spread)`, where the fBm composites `octaves` octaves of
//! gradient noise with frequency doubling and amplitude falling by
//! `persistence` per octave. The per-call `seed` argument is combined with
//! the block's own `seed` field, so one world seed decorrelates every
//! channel.

use glam::Vec3;
use noise::{NoiseFn, Perlin};
use serde::{Deserialize, Serialize};

/// Parameters of one noise channel.
///
/// `spread` components must be non-zero: they divide the sample
/// coordinates to set the spatial scale per axis (2D sampling uses the x
/// and y components).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NoiseParams {
    pub offset: f32,
    pub scale: f32,
    pub spread: Vec3,
    pub seed: i32,
    pub octaves: u32,
    pub persistence: f32,
}

fn seeded(np_seed: i32, seed: u64) -> Perlin {
    Perlin::new(seed.wrapping_add(np_seed as i64 as u64) as u32)
}

fn fbm_2d(noise: &Perlin, x: f64, y: f64, octaves: u32, persistence: f64) -> f64 {
    let mut total = 0.0;
    let mut frequency = 1.0;
    let mut amplitude = 1.0;
    for _ in 0..octaves {
        total += noise.get([x * frequency, y * frequency]) * amplitude;
        frequency *= 2.0;
        amplitude *= persistence;
    }
    total
}

fn fbm_3d(noise: &Perlin, x: f64, y: f64, z: f64, octaves: u32, persistence: f64) -> f64 {
    let mut total = 0.0;
    let mut frequency = 1.0;
    let mut amplitude = 1.0;
    for _ in 0..octaves {
        total += noise.get([x * frequency, y * frequency, z * frequency]) * amplitude;
        frequency *= 2.0;
        amplitude *= persistence;
    }
    total
}

/// Samples the channel at a 2D coordinate.
pub fn perlin_2d(np: &NoiseParams, x: f64, y: f64, seed: u64) -> f32 {
    let noise = seeded(np.seed, seed);
    let value = fbm_2d(
        &noise,
        x / np.spread.x as f64,
        y / np.spread.y as f64,
        np.octaves,
        np.persistence as f64,
    );
    np.offset + np.scale * value as f32
}

/// Samples the channel at a 3D coordinate.
pub fn perlin_3d(np: &NoiseParams, x: f64, y: f64, z: f64, seed: u64) -> f32 {
    let noise = seeded(np.seed, seed);
    let value = fbm_3d(
        &noise,
        x / np.spread.x as f64,
        y / np.spread.y as f64,
        z / np.spread.z as f64,
        np.octaves,
        np.persistence as f64,
    );
    np.offset + np.scale * value as f32
}

/// Bulk 2D fill over an `sx` by `sz` rectangle, z-major with x varying
/// fastest — the order the sheet-ore column walk consumes.
pub struct NoiseMap {
    pub np: NoiseParams,
    sx: usize,
    sz: usize,
    pub result: Vec<f32>,
}

impl NoiseMap {
    pub fn new(np: NoiseParams, sx: usize, sz: usize) -> Self {
        Self {
            np,
            sx,
            sz,
            result: vec![0.0; sx * sz],
        }
    }

    /// Recomputes the map with its lower corner at `(x0, z0)`.
    pub fn fill(&mut self, x0: i32, z0: i32, seed: u64) {
        let noise = seeded(self.np.seed, seed);
        let persistence = self.np.persistence as f64;
        let mut i = 0;
        for z in 0..self.sz {
            for x in 0..self.sx {
                let value = fbm_2d(
                    &noise,
                    (x0 + x as i32) as f64 / self.np.spread.x as f64,
                    (z0 + z as i32) as f64 / self.np.spread.y as f64,
                    self.np.octaves,
                    persistence,
                );
                self.result[i] = self.np.offset + self.np.scale * value as f32;
                i += 1;
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
