//! Deterministic pseudo-random generators for placement routines.
//!
//! Every placement routine derives its generator state from `blockseed`
//! (a 32-bit value the generator variant computes from the world seed and
//! the chunk coordinates) plus a per-use additive salt. The salts and the
//! generator's exact sequence are part of the on-disk world contract:
//! scatter ores seed with `blockseed`, sheet ores with `blockseed + 4234`,
//! and the decoration driver with `blockseed + 53`.

use std::sync::{LazyLock, Mutex};

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Small-state LCG with a platform-independent sequence.
///
/// State advances as `next * 1103515245 + 12345` (wrapping, 32-bit); each
/// draw exposes bits 16..31 of the state, giving outputs in `0..32768`.
pub struct PseudoRandom {
    next: u32,
}

impl PseudoRandom {
    pub fn new(seed: u32) -> Self {
        Self { next: seed }
    }

    fn next(&mut self) -> i32 {
        self.next = self.next.wrapping_mul(1103515245).wrapping_add(12345);
        ((self.next / 65536) % 32768) as i32
    }

    /// Uniform integer in `[min, max]` inclusive.
    ///
    /// The span must not exceed the generator's output period (32768).
    pub fn range(&mut self, min: i32, max: i32) -> i32 {
        assert!(min <= max, "empty range [{min}, {max}]");
        debug_assert!(max - min <= 32767, "range [{min}, {max}] wider than the output period");
        self.next() % (max - min + 1) + min
    }
}

// ---------------------------------------------------------------------------
// Process-wide generator
// ---------------------------------------------------------------------------

static GLOBAL_RNG: LazyLock<Mutex<ChaCha8Rng>> =
    LazyLock::new(|| Mutex::new(ChaCha8Rng::seed_from_u64(0)));

/// Reseeds the process-wide generator. Called once at world load; between
/// reseeds the generator is left to its own advancement.
pub fn reseed_global(seed: u64) {
    let mut rng = GLOBAL_RNG.lock().expect("global rng lock poisoned");
    *rng = ChaCha8Rng::seed_from_u64(seed);
}

/// Uniform integer in `[min, max]` inclusive from the process-wide
/// generator. Schematic probability masks draw from here.
pub fn rand_range(min: i32, max: i32) -> i32 {
    let mut rng = GLOBAL_RNG.lock().expect("global rng lock poisoned");
    rng.random_range(min..=max)
}

/// Serialises tests that consume the process-wide generator, so parallel
/// test threads cannot interleave its stream.
#[cfg(test)]
pub(crate) static GLOBAL_TEST_LOCK: Mutex<()> = Mutex::new(());

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
