//! Challenge-response state machine.
//!
//! ```text
//! Idle ──(challenge ∧ enable ∧ ¬lock)──► Accumulating(0) ─► … ─► Accumulating(15) ─► Emit ─► Idle
//!   ▲                                        │
//!   └────────────────(¬enable ∨ lock)────────┘  (from any state)
//! ```

use super::{
    challenge::{Challenge, Response, CHALLENGE_BYTES},
    keys::DeviceKeyMaterial,
};
use crate::noise::{Block256, NoiseSample};

/// Number of accumulation steps per response (one per challenge byte).
pub const ACCUMULATION_STEPS: u8 = CHALLENGE_BYTES as u8;

/// Ticks from presenting a challenge in `Idle` to the `valid` pulse:
/// one start tick plus one tick per accumulation step.
pub const RESPONSE_LATENCY_TICKS: u64 = 1 + ACCUMULATION_STEPS as u64;

/// Generator phase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Phase {
    /// Waiting for a challenge.
    #[default]
    Idle,
    /// Processing accumulation step `step` on the next tick.
    Accumulating { step: u8 },
    /// Response published; `valid` is high for this one tick.
    Emit,
}

/// Generator registers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PufState {
    phase: Phase,
    /// Challenge latched when accumulation started.
    challenge: Challenge,
    /// Most recent per-step accumulator.
    accumulator: Block256,
    response: Response,
    valid: bool,
}

impl PufState {
    /// Current phase.
    #[inline]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Challenge latched by the current or most recent computation.
    #[inline]
    pub fn challenge(&self) -> Challenge {
        self.challenge
    }

    /// Published response. Zero until the first completed computation.
    #[inline]
    pub fn response(&self) -> Response {
        self.response
    }

    /// High for exactly the tick the response is emitted.
    #[inline]
    pub fn valid(&self) -> bool {
        self.valid
    }

    /// Returns true while a computation is in flight.
    #[inline]
    pub fn is_busy(&self) -> bool {
        matches!(self.phase, Phase::Accumulating { .. })
    }

    pub(crate) fn encode_into(&self, out: &mut Vec<u8>) {
        let (tag, step) = match self.phase {
            Phase::Idle => (0u8, 0u8),
            Phase::Accumulating { step } => (1, step),
            Phase::Emit => (2, 0),
        };
        out.push(tag);
        out.push(step);
        out.extend_from_slice(self.challenge.as_bytes());
        out.extend_from_slice(&self.accumulator.to_le_bytes());
        out.extend_from_slice(&self.response.to_bytes());
        out.push(self.valid as u8);
    }
}

/// Control inputs seen by the generator in one tick.
#[derive(Debug, Clone, Copy, Default)]
pub struct PufInputs {
    /// Global enable; low cancels any computation.
    pub enable: bool,
    /// Lock; forces the generator idle.
    pub security_lock: bool,
    /// Challenge presented this tick, if any.
    pub challenge: Option<Challenge>,
}

/// Derives a device response from a challenge and the noise samples of
/// sixteen consecutive ticks.
///
/// Step `s` selects noise index `i = challenge[s]` and computes
///
/// ```text
/// acc_s = rotl(acc_{s-1}, 1) ⊕ rotl(noise_s, i) ⊕ mix
/// ```
///
/// After the last step the response is `acc_14 ⊕ acc_15 ⊕ a ⊕ b`, where
/// `mix`, `a` and `b` are device constants. Rotating the accumulator by
/// one before each fold keeps every challenge byte in the final XOR.
#[derive(Debug, Clone)]
pub struct ChallengeResponseGenerator {
    keys: DeviceKeyMaterial,
}

impl ChallengeResponseGenerator {
    /// Creates a generator for the given device keys.
    pub fn new(keys: DeviceKeyMaterial) -> Self {
        Self { keys }
    }

    /// Computes the next generator state from the previous one.
    pub fn step(&self, prev: &PufState, inputs: &PufInputs, noise: &NoiseSample) -> PufState {
        // Cancellation is immediate and keeps nothing.
        if !inputs.enable || inputs.security_lock {
            return PufState::default();
        }

        match prev.phase {
            Phase::Idle => match inputs.challenge {
                Some(challenge) => PufState {
                    phase: Phase::Accumulating { step: 0 },
                    challenge,
                    accumulator: Block256::ZERO,
                    response: Response::ZERO,
                    valid: false,
                },
                None => *prev,
            },
            Phase::Accumulating { step } => {
                let index = prev.challenge.byte(step as usize);
                let accumulator =
                    prev.accumulator.rotate_left(1) ^ noise.rotate_left(u32::from(index)) ^ self.keys.mix;

                if step + 1 == ACCUMULATION_STEPS {
                    let response = Response::from_block(
                        prev.accumulator
                            ^ accumulator
                            ^ self.keys.response_a
                            ^ self.keys.response_b,
                    );
                    tracing::debug!(challenge = %prev.challenge, "Response emitted");
                    PufState {
                        phase: Phase::Emit,
                        challenge: prev.challenge,
                        accumulator: Block256::ZERO,
                        response,
                        valid: true,
                    }
                } else {
                    PufState {
                        phase: Phase::Accumulating { step: step + 1 },
                        accumulator,
                        ..*prev
                    }
                }
            }
            Phase::Emit => PufState {
                phase: Phase::Idle,
                valid: false,
                ..*prev
            },
        }
    }
}
