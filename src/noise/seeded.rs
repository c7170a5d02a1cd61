//! Deterministic noise for tests and reproducible simulation.

use super::{Block256, NoiseSample, NoiseSource};
use rand_chacha::ChaCha20Rng;
use rand_core::{RngCore, SeedableRng};

/// Seeded noise source backed by ChaCha20.
///
/// Two instances built from the same seed produce the same sample
/// sequence, which is what makes responses reproducible in tests.
/// NOT a model of physical noise.
pub struct SeededNoise {
    rng: ChaCha20Rng,
    seed: u64,
    samples: u64,
}

impl SeededNoise {
    /// Creates a source from a 64-bit seed.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha20Rng::seed_from_u64(seed),
            seed,
            samples: 0,
        }
    }

    /// Returns the seed this source was built from.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Returns the number of samples drawn so far.
    pub fn samples_drawn(&self) -> u64 {
        self.samples
    }
}

impl NoiseSource for SeededNoise {
    fn sample(&mut self) -> NoiseSample {
        let mut bytes = [0u8; 32];
        self.rng.fill_bytes(&mut bytes);
        self.samples += 1;
        Block256::from_le_bytes(bytes)
    }

    fn describe(&self) -> String {
        format!("seeded(chacha20, seed={})", self.seed)
    }
}

impl std::fmt::Debug for SeededNoise {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SeededNoise")
            .field("seed", &self.seed)
            .field("samples", &self.samples)
            .finish_non_exhaustive()
    }
}
