//! Entropy stream quality checks.
//!
//! Statistical sanity checks over harvested words, used by the
//! power-on self-test. These are not cryptographic proofs of entropy.

mod statistics;
mod threshold;

pub use statistics::StreamStatistics;
pub use threshold::{QualityThresholds, QualityViolation};
