//! Per-tick inputs.

use crate::environment::SensorInputs;
use crate::puf::Challenge;

/// Write-only control signals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ControlInputs {
    /// Global enable.
    pub enable: bool,
    /// Synchronous reset of every register except self-destruct.
    pub reset: bool,
    /// Forces the generator idle; arms the kill switch together with `enable`.
    pub security_lock: bool,
}

/// Everything presented to the controller for one tick.
#[derive(Debug, Clone, Copy, Default)]
pub struct TickInputs {
    /// Control signals.
    pub control: ControlInputs,
    /// Challenge presented on the challenge-response interface.
    pub challenge: Option<Challenge>,
    /// Entropy consumer `ready`.
    pub entropy_ready: bool,
    /// Raw environmental sensor inputs.
    pub sensors: SensorInputs,
}

impl TickInputs {
    /// Disabled, no challenge, consumer not ready, nominal sensors.
    pub fn idle() -> Self {
        Self::default()
    }

    /// Enabled with a ready entropy consumer and nominal sensors.
    pub fn running() -> Self {
        Self {
            control: ControlInputs {
                enable: true,
                ..ControlInputs::default()
            },
            entropy_ready: true,
            ..Self::default()
        }
    }

    /// Presents `challenge` this tick.
    pub fn with_challenge(mut self, challenge: Challenge) -> Self {
        self.challenge = Some(challenge);
        self
    }

    /// Replaces the sensor inputs.
    pub fn with_sensors(mut self, sensors: SensorInputs) -> Self {
        self.sensors = sensors;
        self
    }

    /// Sets the entropy consumer `ready`.
    pub fn with_ready(mut self, ready: bool) -> Self {
        self.entropy_ready = ready;
        self
    }

    /// Sets `enable`.
    pub fn with_enable(mut self, enable: bool) -> Self {
        self.control.enable = enable;
        self
    }

    /// Sets `reset`.
    pub fn with_reset(mut self, reset: bool) -> Self {
        self.control.reset = reset;
        self
    }

    /// Sets `security_lock`.
    pub fn with_security_lock(mut self, security_lock: bool) -> Self {
        self.control.security_lock = security_lock;
        self
    }
}
