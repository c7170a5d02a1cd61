//! Kill-switch detection and the self-destruct latch.

use super::latch::{IrreversibleLatch, StickyLatch};
use crate::config::EnvironmentLimits;
use crate::controller::ControlInputs;
use crate::environment::EnvironmentalReading;

/// Security supervisor registers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SecurityState {
    kill_switch: StickyLatch,
    self_destruct: IrreversibleLatch,
}

impl SecurityState {
    /// Power-on state: nothing armed.
    pub const fn power_on() -> Self {
        Self {
            kill_switch: StickyLatch::new(),
            self_destruct: IrreversibleLatch::new(),
        }
    }

    /// Kill-switch latch.
    #[inline]
    pub fn kill_switch_detected(&self) -> bool {
        self.kill_switch.is_armed()
    }

    /// Self-destruct latch.
    #[inline]
    pub fn self_destruct_asserted(&self) -> bool {
        self.self_destruct.is_armed()
    }
}

/// Derives the kill-switch and self-destruct flags.
///
/// The kill switch arms when `security_lock` and `enable` are asserted in
/// the same tick and clears only on reset. Self-destruct arms when this
/// tick's tamper latch is set and this tick's reading is a critical
/// excursion; it is never cleared, not even by reset.
#[derive(Debug, Clone)]
pub struct SecuritySupervisor {
    limits: EnvironmentLimits,
}

impl SecuritySupervisor {
    /// Creates a supervisor for the given limits.
    pub fn new(limits: EnvironmentLimits) -> Self {
        Self { limits }
    }

    /// Returns true for a reading past the self-destruct limits.
    pub fn is_critical(&self, reading: &EnvironmentalReading) -> bool {
        reading.temperature_c > self.limits.critical_temp_c
            || reading.voltage_cv < self.limits.critical_voltage_cv
    }

    /// Computes the next supervisor state.
    pub fn step(
        &self,
        prev: &SecurityState,
        tamper: bool,
        reading: &EnvironmentalReading,
        control: &ControlInputs,
    ) -> SecurityState {
        let mut kill_switch = prev.kill_switch;
        if control.reset {
            kill_switch.acknowledge_and_clear();
        } else if control.security_lock && control.enable {
            if !kill_switch.is_armed() {
                tracing::warn!("Kill-switch attempt detected");
            }
            kill_switch.arm();
        }

        let mut self_destruct = prev.self_destruct;
        if tamper && self.is_critical(reading) {
            if !self_destruct.is_armed() {
                tracing::error!(
                    temperature_c = reading.temperature_c,
                    voltage_cv = reading.voltage_cv,
                    "Self-destruct asserted"
                );
            }
            self_destruct.arm();
        }

        SecurityState {
            kill_switch,
            self_destruct,
        }
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

    fn control(enable: bool, reset: bool, security_lock: bool) -> ControlInputs {
        ControlInputs {
            enable,
            reset,
            security_lock,
        }
    }

    fn supervisor() -> SecuritySupervisor {
        SecuritySupervisor::new(EnvironmentLimits::default())
    }

    #[test]
    fn test_kill_switch_requires_both_inputs() {
        let sup = supervisor();
        let start = SecurityState::power_on();

        let s = sup.step(&start, false, &nominal(), &control(false, false, true));
        assert!(!s.kill_switch_detected());

        let s = sup.step(&start, false, &nominal(), &control(true, false, false));
        assert!(!s.kill_switch_detected());

        let s = sup.step(&start, false, &nominal(), &control(true, false, true));
        assert!(s.kill_switch_detected());
    }

    #[test]
    fn test_kill_switch_sticky_until_reset() {
        let sup = supervisor();
        let armed = sup.step(
            &SecurityState::power_on(),
            false,
            &nominal(),
            &control(true, false, true),
        );

        let held = sup.step(&armed, false, &nominal(), &control(false, false, false));
        assert!(held.kill_switch_detected());

        let cleared = sup.step(&held, false, &nominal(), &control(false, true, false));
        assert!(!cleared.kill_switch_detected());
    }

    #[test]
    fn test_self_destruct_needs_tamper() {
        let sup = supervisor();
        let hot = EnvironmentalReading {
            temperature_c: 101,
            ..nominal()
        };

        let s = sup.step(&SecurityState::power_on(), false, &hot, &control(true, false, false));
        assert!(!s.self_destruct_asserted());

        let s = sup.step(&s, true, &hot, &control(true, false, false));
        assert!(s.self_destruct_asserted());
    }

    #[test]
    fn test_self_destruct_on_critical_undervoltage() {
        let sup = supervisor();
        let brownout = EnvironmentalReading {
            voltage_cv: 119,
            ..nominal()
        };
        let s = sup.step(
            &SecurityState::power_on(),
            true,
            &brownout,
            &control(true, false, false),
        );
        assert!(s.self_destruct_asserted());
    }

    #[test]
    fn test_critical_limits_are_exclusive() {
        let sup = supervisor();
        let edge = EnvironmentalReading {
            temperature_c: 100,
            voltage_cv: 120,
            tamper_mask: 0,
        };
        assert!(!sup.is_critical(&edge));
    }

    #[test]
    fn test_self_destruct_survives_reset() {
        let sup = supervisor();
        let hot = EnvironmentalReading {
            temperature_c: 120,
            ..nominal()
        };
        let s = sup.step(&SecurityState::power_on(), true, &hot, &control(true, false, false));
        assert!(s.self_destruct_asserted());

        let s = sup.step(&s, false, &nominal(), &control(true, true, false));
        assert!(s.self_destruct_asserted());
    }
}
