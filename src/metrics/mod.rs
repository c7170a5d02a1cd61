//! Prometheus metrics exporter for trust anchor telemetry.
//!
//! Mirrors the read-only status interface and the activity counters
//! in Prometheus format. The HTTP endpoint is behind the `metrics`
//! feature.
//!
//! # Metrics Exposed
//!
//! ## Status
//! - `trust_anchor_health_status` - Current health (1=healthy, 0=unhealthy)
//! - `trust_anchor_entropy_rate_kbps` - Last published entropy rate
//! - `trust_anchor_temperature_celsius` - Die temperature
//! - `trust_anchor_voltage_centivolts` - Supply voltage
//!
//! ## Latches
//! - `trust_anchor_tamper_detected`
//! - `trust_anchor_kill_switch_detected`
//! - `trust_anchor_self_destruct_asserted`
//!
//! ## Activity
//! - `trust_anchor_ticks_total`
//! - `trust_anchor_entropy_words_delivered_total`
//! - `trust_anchor_entropy_words_dropped_total`
//! - `trust_anchor_puf_responses_total`
//!
//! # Example
//!
//! ```no_run
//! use trust_anchor::metrics::{MetricsRegistry, MetricsSnapshot};
//! use trust_anchor::{AnchorConfig, Controller, SeededNoise, TickInputs};
//!
//! let registry = MetricsRegistry::new().expect("Failed to create registry");
//! let mut anchor = Controller::new(&AnchorConfig::default(), SeededNoise::new(42))
//!     .expect("valid config");
//!
//! let status = anchor.tick(&TickInputs::running());
//! registry.update(&MetricsSnapshot::from_status(&status, &anchor.counters()));
//! ```

mod collector;
#[cfg(feature = "metrics")]
mod server;

pub use collector::{MetricsError, MetricsRegistry, MetricsSnapshot};
#[cfg(feature = "metrics")]
pub use server::{MetricsServer, MetricsServerConfig, MetricsState, ServerError};
