//! Statistical sanity checks over delivered entropy words.
//!
//! These tests detect gross failures (stuck oscillators, a broken
//! debiaser), not subtle ones. Passing them is necessary but not
//! sufficient for good entropy.

use serde::Serialize;

/// Statistics of a bitstream made of 32-bit words, MSB first.
#[derive(Debug, Clone, Serialize)]
pub struct StreamStatistics {
    /// Fraction of ones minus 0.5; 0.0 is unbiased.
    pub bit_bias: f64,
    /// Lag-1 correlation between consecutive bits.
    pub serial_correlation: f64,
    /// Longest run of identical bits.
    pub longest_run: usize,
    /// Number of words analyzed.
    pub sample_words: usize,
}

impl StreamStatistics {
    /// Runs all tests on a sequence of words.
    pub fn analyze(words: &[u32]) -> Self {
        let bits: Vec<u8> = words
            .iter()
            .flat_map(|&w| (0..32).rev().map(move |i| ((w >> i) & 1) as u8))
            .collect();

        Self {
            bit_bias: Self::compute_bias(words),
            serial_correlation: Self::compute_serial_correlation(&bits),
            longest_run: Self::compute_longest_run(&bits),
            sample_words: words.len(),
        }
    }

    fn compute_bias(words: &[u32]) -> f64 {
        if words.is_empty() {
            return 0.0;
        }
        let ones: u64 = words.iter().map(|w| u64::from(w.count_ones())).sum();
        ones as f64 / (words.len() as f64 * 32.0) - 0.5
    }

    /// Covariance of neighbouring bits over their variance.
    fn compute_serial_correlation(bits: &[u8]) -> f64 {
        if bits.len() < 2 {
            return 0.0;
        }

        let n = bits.len() as f64;
        let mean = bits.iter().map(|&b| b as f64).sum::<f64>() / n;
        let variance: f64 = bits.iter().map(|&b| (b as f64 - mean).powi(2)).sum();

        if variance == 0.0 {
            return 1.0; // Stuck stream = perfect correlation
        }

        let covariance: f64 = bits
            .windows(2)
            .map(|w| (w[0] as f64 - mean) * (w[1] as f64 - mean))
            .sum();

        covariance / variance
    }

    fn compute_longest_run(bits: &[u8]) -> usize {
        let mut longest = 0;
        let mut current = 0;
        let mut last = None;
        for &bit in bits {
            if Some(bit) == last {
                current += 1;
            } else {
                current = 1;
                last = Some(bit);
            }
            longest = longest.max(current);
        }
        longest
    }
}
