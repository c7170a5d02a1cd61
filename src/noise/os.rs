//! Noise drawn from the operating system entropy device.

use super::{Block256, NoiseSample, NoiseSource};
use rand_core::{OsRng, RngCore};

/// Noise source bound to the OS entropy device (`getrandom`).
///
/// Stands in for a real oscillator array. A failed read is logged and
/// yields an all-zero sample: constant noise produces no accepted bits,
/// so the entropy rate collapses and the anchor reports unhealthy.
#[derive(Debug, Default)]
pub struct OsNoise {
    failures: u64,
}

impl OsNoise {
    /// Creates an OS-backed noise source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of failed reads so far.
    pub fn failures(&self) -> u64 {
        self.failures
    }
}

impl NoiseSource for OsNoise {
    fn sample(&mut self) -> NoiseSample {
        let mut bytes = [0u8; 32];
        match OsRng.try_fill_bytes(&mut bytes) {
            Ok(()) => Block256::from_le_bytes(bytes),
            Err(e) => {
                self.failures += 1;
                tracing::warn!(error = %e, failures = self.failures, "OS noise read failed");
                Block256::ZERO
            }
        }
    }

    fn describe(&self) -> String {
        "os(getrandom)".to_string()
    }
}
