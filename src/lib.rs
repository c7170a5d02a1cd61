//! Hardware Trust Anchor
//!
//! A tick-accurate model of a hardware root of trust: a physically
//! unclonable function answering 128-bit challenges with 256-bit
//! responses, a debiased entropy harvester with throughput monitoring,
//! and environmental tamper supervision with sticky and irreversible
//! security latches.
//!
//! # Architecture
//!
//! ```text
//! noise ─> puf, entropy ─┐
//! sensors ─> environment ┼─> security ─> controller ─> status / metrics
//!                        └──────────────────┘
//! ```
//!
//! Every component is a pure step function from the previous tick's
//! committed state and the current inputs to the next state. The
//! [`Controller`] draws one noise sample per tick, steps every
//! component and commits the result atomically.
//!
//! # Design Principles
//!
//! - **Fail-closed**: health is recomputed every tick and latches only
//!   ever clear on reset; self-destruct never clears
//! - **Injected randomness**: all noise comes from a [`NoiseSource`], so
//!   seeded runs are reproducible bit for bit
//! - **Uses standard primitives**: SHA-256 for key derivation, BLAKE3
//!   for state commitments, ChaCha20 for the seeded noise source
//!
//! # Example
//!
//! ```no_run
//! use trust_anchor::{AnchorConfig, Challenge, Controller, SeededNoise, SensorInputs};
//!
//! let config = AnchorConfig::default();
//! let mut anchor = Controller::new(&config, SeededNoise::new(42)).unwrap();
//!
//! let challenge: Challenge = "00112233445566778899aabbccddeeff".parse().unwrap();
//! if let Some(response) = anchor.respond(challenge, SensorInputs::NOMINAL) {
//!     println!("response: {response}");
//! }
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
#![deny(unsafe_code)]

pub mod analysis;
pub mod config;
pub mod controller;
pub mod entropy;
pub mod environment;
pub mod integrity;
pub mod metrics;
pub mod noise;
pub mod puf;
pub mod security;

// Re-export commonly used types at crate root
pub use analysis::{QualityThresholds, StreamStatistics};
pub use config::{AnchorConfig, ConfigError, FileConfig};
pub use controller::{
    AnchorState, ControlInputs, Controller, Counters, ResponseOutput, SelfTestReport,
    StatusSnapshot, TickInputs,
};
pub use entropy::{BackpressurePolicy, EntropySample};
pub use environment::{EnvironmentalReading, SensorInputs, TamperCause};
pub use integrity::StateCommitment;
pub use noise::{Block256, NoiseSource, OsNoise, SeededNoise};
pub use puf::{Challenge, Response};
pub use security::HealthFault;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
