//! Entropy harvesting.
//!
//! Converts per-tick noise samples into a debiased stream of 32-bit words
//! behind a `(valid, ready)` handshake, and measures delivered throughput.
//!
//! ```text
//! noise → fold → Von Neumann → shift register → pending word ⇄ consumer
//!                                                    ↓
//!                                               rate monitor
//! ```

mod debias;
mod extract;
mod harvester;
mod rate;

pub use debias::VonNeumann;
pub use extract::{fold_raw_bit, FOLD_GROUPS};
pub use harvester::{
    BackpressurePolicy, EntropyHarvester, EntropySample, HarvestStep, HarvesterState, WORD_BITS,
};
pub use rate::{RateMonitor, RateState};
