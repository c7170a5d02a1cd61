//! Read-only status published after each tick.

use crate::puf::Response;
use serde::Serialize;

/// Status and telemetry interface.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusSnapshot {
    /// Rate measured over the last complete window.
    pub entropy_rate_kbps: u32,
    /// Die temperature in degrees Celsius.
    pub temperature_c: i16,
    /// Supply voltage in hundredths of a volt.
    pub voltage_centivolts: u16,
    /// Tamper latch.
    pub tamper_detected: bool,
    /// Current-tick health; never latched.
    pub healthy: bool,
    /// Kill-switch latch.
    pub kill_switch_detected: bool,
    /// Self-destruct latch; never cleared.
    pub self_destruct_asserted: bool,
}

/// Challenge-response interface output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResponseOutput {
    /// Most recent response; zero after reset or cancellation.
    pub response: Response,
    /// High for exactly one tick per completed computation.
    pub valid: bool,
}

/// Monotonic activity counters. Not device registers: reset does not
/// clear them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Counters {
    /// Ticks since power-on.
    pub ticks: u64,
    /// Entropy words handed to the consumer.
    pub words_delivered: u64,
    /// Pending words overwritten before delivery.
    pub words_dropped: u64,
    /// Completed challenge responses.
    pub responses_emitted: u64,
}
