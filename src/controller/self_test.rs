//! Power-on entropy self-test verdict.

use crate::analysis::{QualityThresholds, StreamStatistics};
use serde::Serialize;

/// Outcome of [`Controller::self_test`](super::Controller::self_test).
#[derive(Debug, Clone, Serialize)]
pub struct SelfTestReport {
    /// Words delivered during the run.
    pub words: usize,
    /// Rate published at the end of the run.
    pub rate_kbps: u32,
    /// Minimum rate the device needs to be healthy.
    pub min_rate_kbps: u32,
    /// Statistics over the collected words.
    pub statistics: StreamStatistics,
    /// First quality threshold violated, if any.
    pub violation: Option<String>,
    /// Overall verdict.
    pub passed: bool,
}

impl SelfTestReport {
    pub(crate) fn evaluate(
        words: &[u32],
        rate_kbps: u32,
        min_rate_kbps: u32,
        thresholds: &QualityThresholds,
    ) -> Self {
        let statistics = StreamStatistics::analyze(words);
        let violation = thresholds.check(&statistics).err().map(|v| v.to_string());
        let passed = violation.is_none() && rate_kbps >= min_rate_kbps;

        Self {
            words: words.len(),
            rate_kbps,
            min_rate_kbps,
            statistics,
            violation,
            passed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_low_rate_fails() {
        let words: Vec<u32> = (0..64u32).map(|i| i.wrapping_mul(0x9e37_79b9)).collect();
        let report = SelfTestReport::evaluate(&words, 100, 512, &QualityThresholds::default());
        assert!(!report.passed);
    }

    #[test]
    fn test_stuck_words_fail() {
        let report = SelfTestReport::evaluate(&[0; 64], 10_000, 512, &QualityThresholds::default());
        assert!(!report.passed);
        assert!(report.violation.is_some());
    }
}
