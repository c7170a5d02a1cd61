//! Sticky tamper alarm.

use super::monitor::EnvironmentalReading;
use crate::config::EnvironmentLimits;
use crate::security::StickyLatch;

/// Condition that armed (or would arm) the tamper latch.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TamperCause {
    /// A discrete tamper sensor fired.
    #[error("tamper sensors tripped: mask {mask:#010x}")]
    SensorTripped { mask: u32 },

    /// Too hot.
    #[error("temperature {observed} C above limit {limit} C")]
    OverTemperature { observed: i16, limit: i16 },

    /// Too cold.
    #[error("temperature {observed} C below limit {limit} C")]
    UnderTemperature { observed: i16, limit: i16 },

    /// Supply outside the allowed band.
    #[error("voltage {observed} cV outside safe band {min}-{max} cV")]
    VoltageOutOfBand { observed: u16, min: u16, max: u16 },
}

/// Aggregates environmental readings into the sticky tamper flag.
#[derive(Debug, Clone)]
pub struct TamperSupervisor {
    limits: EnvironmentLimits,
}

impl TamperSupervisor {
    /// Creates a supervisor for the given limits.
    pub fn new(limits: EnvironmentLimits) -> Self {
        Self { limits }
    }

    /// Evaluates the tamper condition for one reading.
    ///
    /// Conditions are OR-combined; the first one found is reported.
    /// Temperature limits are compared as signed values.
    pub fn detect(&self, reading: &EnvironmentalReading) -> Option<TamperCause> {
        let limits = &self.limits;

        if reading.tamper_mask != 0 {
            return Some(TamperCause::SensorTripped {
                mask: reading.tamper_mask,
            });
        }
        if reading.temperature_c > limits.tamper_temp_high_c {
            return Some(TamperCause::OverTemperature {
                observed: reading.temperature_c,
                limit: limits.tamper_temp_high_c,
            });
        }
        if reading.temperature_c < limits.tamper_temp_low_c {
            return Some(TamperCause::UnderTemperature {
                observed: reading.temperature_c,
                limit: limits.tamper_temp_low_c,
            });
        }
        if !(limits.safe_voltage_min_cv..=limits.safe_voltage_max_cv).contains(&reading.voltage_cv)
        {
            return Some(TamperCause::VoltageOutOfBand {
                observed: reading.voltage_cv,
                min: limits.safe_voltage_min_cv,
                max: limits.safe_voltage_max_cv,
            });
        }
        None
    }

    /// Computes the next tamper latch value.
    ///
    /// Reset takes priority over a condition firing in the same tick.
    pub fn step(
        &self,
        prev: StickyLatch,
        reading: &EnvironmentalReading,
        reset: bool,
    ) -> StickyLatch {
        let mut next = prev;
        if reset {
            next.acknowledge_and_clear();
        } else if let Some(cause) = self.detect(reading) {
            if !prev.is_armed() {
                tracing::warn!(cause = %cause, "Tamper latch armed");
            }
            next.arm();
        }
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nominal() -> EnvironmentalReading {
        EnvironmentalReading {
            temperature_c: 25,
            voltage_cv: 180,
            tamper_mask: 0,
        }
    }

    fn supervisor() -> TamperSupervisor {
        TamperSupervisor::new(EnvironmentLimits::default())
    }

    #[test]
    fn test_nominal_is_clean() {
        assert_eq!(supervisor().detect(&nominal()), None);
    }

    #[test]
    fn test_each_condition_fires() {
        let sup = supervisor();

        let sensor = EnvironmentalReading {
            tamper_mask: 1 << 17,
            ..nominal()
        };
        assert!(matches!(
            sup.detect(&sensor),
            Some(TamperCause::SensorTripped { mask }) if mask == 1 << 17
        ));

        let hot = EnvironmentalReading {
            temperature_c: 86,
            ..nominal()
        };
        assert!(matches!(
            sup.detect(&hot),
            Some(TamperCause::OverTemperature { .. })
        ));

        let low_v = EnvironmentalReading {
            voltage_cv: 139,
            ..nominal()
        };
        assert!(matches!(
            sup.detect(&low_v),
            Some(TamperCause::VoltageOutOfBand { .. })
        ));

        let high_v = EnvironmentalReading {
            voltage_cv: 221,
            ..nominal()
        };
        assert!(sup.detect(&high_v).is_some());
    }

    #[test]
    fn test_limits_are_exclusive() {
        let sup = supervisor();
        let edge_hot = EnvironmentalReading {
            temperature_c: 85,
            ..nominal()
        };
        let edge_cold = EnvironmentalReading {
            temperature_c: -40,
            ..nominal()
        };
        assert_eq!(sup.detect(&edge_hot), None);
        assert_eq!(sup.detect(&edge_cold), None);
    }

    #[test]
    fn test_signed_cold_comparison() {
        let sup = supervisor();
        let cold = EnvironmentalReading {
            temperature_c: -41,
            ..nominal()
        };
        assert!(matches!(
            sup.detect(&cold),
            Some(TamperCause::UnderTemperature {
                observed: -41,
                limit: -40
            })
        ));

        // A warm reading must never look "below -40"
        let warm = EnvironmentalReading {
            temperature_c: 60,
            ..nominal()
        };
        assert_eq!(sup.detect(&warm), None);
    }

    #[test]
    fn test_latch_is_sticky_until_reset() {
        let sup = supervisor();
        let tripped = EnvironmentalReading {
            tamper_mask: 1,
            ..nominal()
        };

        let latch = sup.step(StickyLatch::default(), &tripped, false);
        assert!(latch.is_armed());

        let latch = sup.step(latch, &nominal(), false);
        assert!(latch.is_armed());

        let latch = sup.step(latch, &nominal(), true);
        assert!(!latch.is_armed());
    }

    #[test]
    fn test_reset_wins_over_condition() {
        let sup = supervisor();
        let tripped = EnvironmentalReading {
            tamper_mask: 1,
            ..nominal()
        };
        let armed = sup.step(StickyLatch::default(), &tripped, false);

        assert!(!sup.step(armed, &tripped, true).is_armed());
    }
}
