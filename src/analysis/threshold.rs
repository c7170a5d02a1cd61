//! Quality thresholds for the entropy self-test.

use super::statistics::StreamStatistics;
use serde::{Deserialize, Serialize};

/// Quality thresholds for a harvested word sample.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualityThresholds {
    /// Maximum acceptable bit bias (absolute value).
    pub max_bit_bias: f64,
    /// Maximum acceptable serial correlation (absolute value).
    pub max_serial_correlation: f64,
    /// Longest tolerated run of identical bits.
    pub max_run: usize,
    /// Minimum number of words for a meaningful verdict.
    pub min_words: usize,
}

impl Default for QualityThresholds {
    fn default() -> Self {
        Self {
            max_bit_bias: 0.05,
            max_serial_correlation: 0.1,
            max_run: 40,
            min_words: 16,
        }
    }
}

impl QualityThresholds {
    /// Checks statistics against thresholds.
    pub fn check(&self, stats: &StreamStatistics) -> Result<(), QualityViolation> {
        if stats.sample_words < self.min_words {
            return Err(QualityViolation::TooFewWords {
                observed: stats.sample_words,
                required: self.min_words,
            });
        }

        if stats.bit_bias.abs() > self.max_bit_bias {
            return Err(QualityViolation::BitBias {
                observed: stats.bit_bias,
                threshold: self.max_bit_bias,
            });
        }

        if stats.serial_correlation.abs() > self.max_serial_correlation {
            return Err(QualityViolation::SerialCorrelation {
                observed: stats.serial_correlation,
                threshold: self.max_serial_correlation,
            });
        }

        if stats.longest_run > self.max_run {
            return Err(QualityViolation::LongRun {
                observed: stats.longest_run,
                threshold: self.max_run,
            });
        }

        Ok(())
    }
}

/// Threshold violation types.
#[derive(Debug, Clone, thiserror::Error)]
pub enum QualityViolation {
    /// Not enough words to judge.
    #[error("only {observed} words harvested, need {required}")]
    TooFewWords { observed: usize, required: usize },

    /// Ones fraction too far from one half.
    #[error("bit bias {observed:.4} exceeds threshold {threshold:.4}")]
    BitBias { observed: f64, threshold: f64 },

    /// Adjacent bits correlated.
    #[error("serial correlation {observed:.4} exceeds threshold {threshold:.4}")]
    SerialCorrelation { observed: f64, threshold: f64 },

    /// Run of identical bits too long.
    #[error("run of {observed} identical bits exceeds {threshold}")]
    LongRun { observed: usize, threshold: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_too_few_words() {
        let stats = StreamStatistics::analyze(&[0x1234_5678; 3]);
        assert!(matches!(
            QualityThresholds::default().check(&stats),
            Err(QualityViolation::TooFewWords { observed: 3, .. })
        ));
    }

    #[test]
    fn test_stuck_stream_fails_bias() {
        let stats = StreamStatistics::analyze(&[0u32; 64]);
        assert!(matches!(
            QualityThresholds::default().check(&stats),
            Err(QualityViolation::BitBias { .. })
        ));
    }

    #[test]
    fn test_alternating_stream_fails_correlation() {
        let stats = StreamStatistics::analyze(&[0x5555_5555; 64]);
        assert!(matches!(
            QualityThresholds::default().check(&stats),
            Err(QualityViolation::SerialCorrelation { .. })
        ));
    }
}
