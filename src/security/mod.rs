//! Protective state machine.
//!
//! Escalation runs from alarm to irreversible shutdown:
//!
//! ```text
//! tamper latch ──┬──► health ✗
//!                └──(+ critical excursion)──► self-destruct (never clears)
//! lock ∧ enable ────► kill-switch latch ──► health ✗
//! ```

mod health;
mod latch;
mod supervisor;

pub use health::{HealthAggregator, HealthFault, HealthInputs};
pub use latch::{IrreversibleLatch, StickyLatch};
pub use supervisor::{SecurityState, SecuritySupervisor};
