//! Challenge-response identity generation.
//!
//! Models the PUF core: a challenge steers which oscillator paths are
//! folded into a 256-bit response over sixteen synchronous steps.
//! Responses are device fingerprints and raw key-derivation input for
//! upstream components.

mod challenge;
mod generator;
mod keys;

pub use challenge::{Challenge, ChallengeParseError, Response, CHALLENGE_BYTES};
pub use generator::{
    ChallengeResponseGenerator, Phase, PufInputs, PufState, ACCUMULATION_STEPS,
    RESPONSE_LATENCY_TICKS,
};
pub use keys::DeviceKeyMaterial;
