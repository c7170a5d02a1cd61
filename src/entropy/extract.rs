//! Raw candidate bit extraction.

use crate::noise::NoiseSample;

/// Number of disjoint 32-bit oscillator groups folded into each raw bit.
pub const FOLD_GROUPS: usize = 4;

/// Folds the four low 32-bit groups of a noise sample into one raw bit.
///
/// The groups are XORed together and the result is parity-reduced, so
/// every one of the 128 contributing oscillators can flip the output.
#[inline]
pub fn fold_raw_bit(noise: &NoiseSample) -> bool {
    let folded = (0..FOLD_GROUPS).fold(0u32, |acc, g| acc ^ noise.word32(g));
    folded.count_ones() & 1 == 1
}
