//! Physical noise capability.
//!
//! The trust anchor never generates randomness itself. Every tick it draws
//! one 256-bit sample (one bit per ring oscillator) from a [`NoiseSource`].
//! Test and simulation builds use [`SeededNoise`]; production-style runs
//! bind to the operating system entropy device through [`OsNoise`].

mod block;
mod os;
mod seeded;

pub use block::Block256;
pub use os::OsNoise;
pub use seeded::SeededNoise;

/// One tick's worth of raw oscillator output.
pub type NoiseSample = Block256;

/// Trait for noise source implementations.
///
/// Implementations must never block: a tick is atomic and has no
/// suspension points.
pub trait NoiseSource {
    /// Draws the next 256-bit noise sample.
    fn sample(&mut self) -> NoiseSample;

    /// Short human-readable description for logs.
    fn describe(&self) -> String;
}

impl<N: NoiseSource + ?Sized> NoiseSource for Box<N> {
    fn sample(&mut self) -> NoiseSample {
        (**self).sample()
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}
