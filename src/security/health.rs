//! Combined device health.

use crate::config::HealthConfig;
use crate::environment::EnvironmentalReading;

/// Everything the health flag depends on, taken from one committed tick.
#[derive(Debug, Clone, Copy)]
pub struct HealthInputs {
    /// Measured entropy rate.
    pub entropy_rate_kbps: u32,
    /// Tamper latch.
    pub tamper_detected: bool,
    /// Kill-switch latch.
    pub kill_switch_detected: bool,
    /// Current environmental reading.
    pub reading: EnvironmentalReading,
}

/// Reason the device is not healthy.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HealthFault {
    /// Entropy rate below the minimum.
    #[error("entropy rate {observed} Kbps below threshold {threshold} Kbps")]
    LowEntropyRate { observed: u32, threshold: u32 },

    /// Tamper latch set.
    #[error("tamper latch is set")]
    TamperLatched,

    /// Kill-switch latch set.
    #[error("kill switch latch is set")]
    KillSwitchLatched,

    /// Temperature above the health limit.
    #[error("temperature {observed} C above safe maximum {threshold} C")]
    OverTemperature { observed: i16, threshold: i16 },

    /// Supply below the health floor.
    #[error("voltage {observed} cV below safe minimum {threshold} cV")]
    UnderVoltage { observed: u16, threshold: u16 },
}

/// Computes the health flag.
///
/// Not a register: health reflects the current tick only and is
/// recomputed from scratch every time.
#[derive(Debug, Clone)]
pub struct HealthAggregator {
    config: HealthConfig,
}

impl HealthAggregator {
    /// Creates an aggregator with the given thresholds.
    pub fn new(config: HealthConfig) -> Self {
        Self { config }
    }

    /// Checks every health condition, returning the first that fails.
    pub fn check(&self, inputs: &HealthInputs) -> Result<(), HealthFault> {
        if inputs.entropy_rate_kbps < self.config.min_rate_kbps {
            return Err(HealthFault::LowEntropyRate {
                observed: inputs.entropy_rate_kbps,
                threshold: self.config.min_rate_kbps,
            });
        }
        if inputs.tamper_detected {
            return Err(HealthFault::TamperLatched);
        }
        if inputs.kill_switch_detected {
            return Err(HealthFault::KillSwitchLatched);
        }
        if inputs.reading.temperature_c > self.config.max_temp_c {
            return Err(HealthFault::OverTemperature {
                observed: inputs.reading.temperature_c,
                threshold: self.config.max_temp_c,
            });
        }
        if inputs.reading.voltage_cv < self.config.min_voltage_cv {
            return Err(HealthFault::UnderVoltage {
                observed: inputs.reading.voltage_cv,
                threshold: self.config.min_voltage_cv,
            });
        }
        Ok(())
    }

    /// Minimum entropy rate for a healthy device.
    pub fn min_rate_kbps(&self) -> u32 {
        self.config.min_rate_kbps
    }

    /// Returns true if every condition holds.
    #[inline]
    pub fn is_healthy(&self, inputs: &HealthInputs) -> bool {
        self.check(inputs).is_ok()
    }
}

impl Default for HealthAggregator {
    fn default() -> Self {
        Self::new(HealthConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn good() -> HealthInputs {
        HealthInputs {
            entropy_rate_kbps: 512,
            tamper_detected: false,
            kill_switch_detected: false,
            reading: EnvironmentalReading {
                temperature_c: 85,
                voltage_cv: 150,
                tamper_mask: 0,
            },
        }
    }

    #[test]
    fn test_boundary_values_are_healthy() {
        assert!(HealthAggregator::default().is_healthy(&good()));
    }

    #[test]
    fn test_each_fault_breaks_health() {
        let agg = HealthAggregator::default();

        let slow = HealthInputs {
            entropy_rate_kbps: 511,
            ..good()
        };
        assert!(matches!(
            agg.check(&slow),
            Err(HealthFault::LowEntropyRate { observed: 511, .. })
        ));

        let tampered = HealthInputs {
            tamper_detected: true,
            ..good()
        };
        assert_eq!(agg.check(&tampered), Err(HealthFault::TamperLatched));

        let killed = HealthInputs {
            kill_switch_detected: true,
            ..good()
        };
        assert_eq!(agg.check(&killed), Err(HealthFault::KillSwitchLatched));

        let mut hot = good();
        hot.reading.temperature_c = 86;
        assert!(matches!(
            agg.check(&hot),
            Err(HealthFault::OverTemperature { .. })
        ));

        let mut sagging = good();
        sagging.reading.voltage_cv = 149;
        assert!(matches!(
            agg.check(&sagging),
            Err(HealthFault::UnderVoltage { .. })
        ));
    }
}
