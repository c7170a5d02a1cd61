//! Committed register state.

use super::status::Counters;
use crate::entropy::{HarvesterState, RateState};
use crate::environment::EnvironmentalReading;
use crate::puf::PufState;
use crate::security::{HealthInputs, SecurityState, StickyLatch};

const ENCODING_DOMAIN: &[u8] = b"trust-anchor-state-v1";

/// Every register of the device, as committed at the end of a tick.
///
/// Built only through [`AnchorState::power_on`]; there is deliberately no
/// `Default`, so the self-destruct latch cannot be re-created cleared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnchorState {
    pub(crate) puf: PufState,
    pub(crate) harvester: HarvesterState,
    pub(crate) rate: RateState,
    pub(crate) reading: EnvironmentalReading,
    pub(crate) tamper: StickyLatch,
    pub(crate) security: SecurityState,
    pub(crate) counters: Counters,
}

impl AnchorState {
    /// Power-on values: every register cleared, no latch armed.
    pub fn power_on() -> Self {
        Self {
            puf: PufState::default(),
            harvester: HarvesterState::default(),
            rate: RateState::default(),
            reading: EnvironmentalReading::default(),
            tamper: StickyLatch::new(),
            security: SecurityState::power_on(),
            counters: Counters::default(),
        }
    }

    /// Challenge-response generator registers.
    pub fn puf(&self) -> &PufState {
        &self.puf
    }

    /// Entropy harvester registers.
    pub fn harvester(&self) -> &HarvesterState {
        &self.harvester
    }

    /// Rate monitor registers.
    pub fn rate(&self) -> &RateState {
        &self.rate
    }

    /// Environmental reading registered this tick.
    pub fn reading(&self) -> &EnvironmentalReading {
        &self.reading
    }

    /// Kill-switch and self-destruct latches.
    pub fn security(&self) -> &SecurityState {
        &self.security
    }

    /// Returns true if the tamper latch is set.
    pub fn tamper_detected(&self) -> bool {
        self.tamper.is_armed()
    }

    pub(crate) fn health_inputs(&self) -> HealthInputs {
        HealthInputs {
            entropy_rate_kbps: self.rate.rate_kbps(),
            tamper_detected: self.tamper.is_armed(),
            kill_switch_detected: self.security.kill_switch_detected(),
            reading: self.reading,
        }
    }

    /// Canonical byte encoding of the registers. Counters are telemetry
    /// and are not part of it.
    pub(crate) fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(128);
        out.extend_from_slice(ENCODING_DOMAIN);
        self.puf.encode_into(&mut out);
        self.harvester.encode_into(&mut out);
        self.rate.encode_into(&mut out);
        out.extend_from_slice(&self.reading.temperature_c.to_le_bytes());
        out.extend_from_slice(&self.reading.voltage_cv.to_le_bytes());
        out.extend_from_slice(&self.reading.tamper_mask.to_le_bytes());
        out.push(self.tamper.is_armed() as u8);
        out.push(self.security.kill_switch_detected() as u8);
        out.push(self.security.self_destruct_asserted() as u8);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entropy::EntropyHarvester;
    use crate::integrity::StateCommitment;
    use crate::noise::Block256;
    use crate::puf::{Challenge, ChallengeResponseGenerator, DeviceKeyMaterial, PufInputs};

    const KEY: [u8; 32] = [7; 32];

    #[test]
    fn test_power_on_encoding_is_stable() {
        assert_eq!(AnchorState::power_on().encode(), AnchorState::power_on().encode());
    }

    #[test]
    fn test_encoding_ignores_counters() {
        let a = AnchorState::power_on();
        let mut b = a;
        b.counters.ticks = 99;
        assert_eq!(a.encode(), b.encode());
    }

    #[test]
    fn test_encoding_sees_latches() {
        let a = AnchorState::power_on();
        let mut b = a;
        b.tamper.arm();
        assert_ne!(a.encode(), b.encode());
    }

    #[test]
    fn test_commitment_covers_accumulator() {
        let gen = ChallengeResponseGenerator::new(DeviceKeyMaterial::derive("test-device"));
        let inputs = PufInputs {
            enable: true,
            security_lock: false,
            challenge: Some(Challenge::ZERO),
        };
        let started = gen.step(&PufState::default(), &inputs, &Block256::ZERO);

        // Same phase, challenge and response; only the accumulator differs
        let mut a = AnchorState::power_on();
        let mut b = a;
        a.puf = gen.step(&started, &inputs, &Block256::from_limbs([1, 0, 0, 0]));
        b.puf = gen.step(&started, &inputs, &Block256::from_limbs([2, 0, 0, 0]));
        assert_eq!(a.puf.phase(), b.puf.phase());
        assert_eq!(a.puf.response(), b.puf.response());

        assert_ne!(StateCommitment::compute(&KEY, &a), StateCommitment::compute(&KEY, &b));
    }

    #[test]
    fn test_commitment_covers_held_debias_bit() {
        let harvester = EntropyHarvester::default();
        let empty = HarvesterState::default();

        let mut a = AnchorState::power_on();
        let mut b = a;
        a.harvester = harvester
            .step(&empty, true, true, &Block256::from_limbs([0, 0, 0, 0]))
            .state;
        b.harvester = harvester
            .step(&empty, true, true, &Block256::from_limbs([1, 0, 0, 0]))
            .state;
        assert_eq!(a.harvester.bit_count(), b.harvester.bit_count());

        assert_ne!(StateCommitment::compute(&KEY, &a), StateCommitment::compute(&KEY, &b));
    }
}
