//! Handshake-gated entropy word producer.

use super::{debias::VonNeumann, extract::fold_raw_bit};
use crate::noise::NoiseSample;
use serde::{Deserialize, Serialize};

/// Bits per delivered entropy word.
pub const WORD_BITS: u8 = 32;

/// Producer behaviour when a completed word is not taken.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackpressurePolicy {
    /// The pending word is dropped as soon as the next accepted bit
    /// arrives. The producer never stalls; words can be lost.
    #[default]
    Overwrite,
    /// The pending word is held until taken; accepted bits are discarded
    /// meanwhile. No completed word is ever lost.
    Stall,
}

/// One entry of the entropy stream as seen by the consumer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct EntropySample {
    /// Last delivered word. Only meaningful on the tick `valid` is set.
    pub data: u32,
    /// Set for exactly the tick in which a word is handed over.
    pub valid: bool,
}

/// Harvester registers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HarvesterState {
    debias: VonNeumann,
    shift: u32,
    bit_count: u8,
    /// Completed word awaiting the consumer (`data_valid`).
    pending: Option<u32>,
    output: EntropySample,
}

impl HarvesterState {
    /// Returns the published stream output.
    #[inline]
    pub fn output(&self) -> EntropySample {
        self.output
    }

    /// Returns true if a completed word is waiting for the consumer.
    #[inline]
    pub fn data_valid(&self) -> bool {
        self.pending.is_some()
    }

    /// Bits currently accumulated toward the next word.
    #[inline]
    pub fn bit_count(&self) -> u8 {
        self.bit_count
    }

    pub(crate) fn encode_into(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.shift.to_le_bytes());
        out.push(self.bit_count);
        out.push(self.debias.encode());
        out.push(self.pending.is_some() as u8);
        out.extend_from_slice(&self.pending.unwrap_or(0).to_le_bytes());
        out.extend_from_slice(&self.output.data.to_le_bytes());
        out.push(self.output.valid as u8);
    }
}

/// Outcome of one harvester tick.
#[derive(Debug, Clone, Copy)]
pub struct HarvestStep {
    /// Next register values.
    pub state: HarvesterState,
    /// A word was handed to the consumer this tick.
    pub delivered: bool,
    /// A pending word was overwritten this tick.
    pub dropped: bool,
}

/// Extracts debiased bits from the noise source into 32-bit words.
///
/// Each tick one raw bit is folded from the noise sample and passed
/// through a Von Neumann corrector. Accepted bits shift into a 32-bit
/// register; a full register becomes the pending word, which is
/// delivered on a tick where the consumer asserts `ready`.
#[derive(Debug, Clone)]
pub struct EntropyHarvester {
    policy: BackpressurePolicy,
}

impl EntropyHarvester {
    /// Creates a harvester with the given backpressure policy.
    pub fn new(policy: BackpressurePolicy) -> Self {
        Self { policy }
    }

    /// Returns the configured backpressure policy.
    pub fn policy(&self) -> BackpressurePolicy {
        self.policy
    }

    /// Computes the next harvester state from the previous one.
    ///
    /// When `enable` is low every register is cleared and nothing is
    /// delivered.
    pub fn step(
        &self,
        prev: &HarvesterState,
        enable: bool,
        ready: bool,
        noise: &NoiseSample,
    ) -> HarvestStep {
        if !enable {
            return HarvestStep {
                state: HarvesterState::default(),
                delivered: false,
                dropped: false,
            };
        }

        let (debias, accepted) = prev.debias.push(fold_raw_bit(noise));

        let mut pending = prev.pending;
        let mut output = EntropySample {
            data: prev.output.data,
            valid: false,
        };
        let mut delivered = false;

        if let (Some(word), true) = (pending, ready) {
            output = EntropySample {
                data: word,
                valid: true,
            };
            pending = None;
            delivered = true;
        }

        let mut shift = prev.shift;
        let mut bit_count = prev.bit_count;
        let mut dropped = false;

        if let Some(bit) = accepted {
            let take = match (pending, self.policy) {
                (Some(_), BackpressurePolicy::Stall) => false,
                (Some(word), BackpressurePolicy::Overwrite) => {
                    tracing::trace!(word, "Pending entropy word dropped");
                    pending = None;
                    dropped = true;
                    true
                }
                (None, _) => true,
            };

            if take {
                shift = (shift << 1) | u32::from(bit);
                bit_count += 1;
                if bit_count == WORD_BITS {
                    pending = Some(shift);
                    shift = 0;
                    bit_count = 0;
                }
            }
        }

        HarvestStep {
            state: HarvesterState {
                debias,
                shift,
                bit_count,
                pending,
                output,
            },
            delivered,
            dropped,
        }
    }
}

impl Default for EntropyHarvester {
    fn default() -> Self {
        Self::new(BackpressurePolicy::default())
    }
}
