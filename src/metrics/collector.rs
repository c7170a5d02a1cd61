//! Metrics collection and registry.

use crate::controller::{Counters, StatusSnapshot};
use prometheus::{Encoder, IntCounter, IntGauge, Registry, TextEncoder};
use thiserror::Error;

/// Errors that can occur during metrics operations.
#[derive(Debug, Error)]
pub enum MetricsError {
    /// Registry error.
    #[error("prometheus error: {0}")]
    Prometheus(#[from] prometheus::Error),
}

/// A snapshot of device state for metrics update.
#[derive(Debug, Clone, Default)]
pub struct MetricsSnapshot {
    /// Current-tick health.
    pub is_healthy: bool,
    /// Measured entropy rate.
    pub entropy_rate_kbps: u32,
    /// Die temperature.
    pub temperature_c: i16,
    /// Supply voltage.
    pub voltage_centivolts: u16,
    /// Tamper latch.
    pub tamper_detected: bool,
    /// Kill-switch latch.
    pub kill_switch_detected: bool,
    /// Self-destruct latch.
    pub self_destruct_asserted: bool,
    /// Ticks since power-on.
    pub ticks: u64,
    /// Total words delivered.
    pub words_delivered: u64,
    /// Total words dropped.
    pub words_dropped: u64,
    /// Total responses emitted.
    pub responses_emitted: u64,
}

impl MetricsSnapshot {
    /// Builds a snapshot from a committed status and the activity counters.
    pub fn from_status(status: &StatusSnapshot, counters: &Counters) -> Self {
        Self {
            is_healthy: status.healthy,
            entropy_rate_kbps: status.entropy_rate_kbps,
            temperature_c: status.temperature_c,
            voltage_centivolts: status.voltage_centivolts,
            tamper_detected: status.tamper_detected,
            kill_switch_detected: status.kill_switch_detected,
            self_destruct_asserted: status.self_destruct_asserted,
            ticks: counters.ticks,
            words_delivered: counters.words_delivered,
            words_dropped: counters.words_dropped,
            responses_emitted: counters.responses_emitted,
        }
    }
}

/// Prometheus metrics registry for trust anchor telemetry.
pub struct MetricsRegistry {
    registry: Registry,

    // Status
    health_status: IntGauge,
    entropy_rate_kbps: IntGauge,
    temperature_celsius: IntGauge,
    voltage_centivolts: IntGauge,

    // Latches
    tamper_detected: IntGauge,
    kill_switch_detected: IntGauge,
    self_destruct_asserted: IntGauge,

    // Activity
    ticks_total: IntCounter,
    words_delivered_total: IntCounter,
    words_dropped_total: IntCounter,
    responses_total: IntCounter,
}

impl MetricsRegistry {
    /// Creates a new registry with every trust anchor metric registered.
    pub fn new() -> Result<Self, MetricsError> {
        let registry = Registry::new();

        let health_status = IntGauge::new(
            "trust_anchor_health_status",
            "Current health status (1=healthy, 0=unhealthy)",
        )?;
        let entropy_rate_kbps = IntGauge::new(
            "trust_anchor_entropy_rate_kbps",
            "Entropy rate published at the end of the last window",
        )?;
        let temperature_celsius = IntGauge::new(
            "trust_anchor_temperature_celsius",
            "Die temperature reading",
        )?;
        let voltage_centivolts = IntGauge::new(
            "trust_anchor_voltage_centivolts",
            "Supply voltage reading in centivolts",
        )?;

        let tamper_detected = IntGauge::new(
            "trust_anchor_tamper_detected",
            "Tamper latch state (1=armed)",
        )?;
        let kill_switch_detected = IntGauge::new(
            "trust_anchor_kill_switch_detected",
            "Kill-switch latch state (1=armed)",
        )?;
        let self_destruct_asserted = IntGauge::new(
            "trust_anchor_self_destruct_asserted",
            "Self-destruct latch state (1=asserted, irreversible)",
        )?;

        let ticks_total = IntCounter::new("trust_anchor_ticks_total", "Ticks since power-on")?;
        let words_delivered_total = IntCounter::new(
            "trust_anchor_entropy_words_delivered_total",
            "Entropy words handed to the consumer",
        )?;
        let words_dropped_total = IntCounter::new(
            "trust_anchor_entropy_words_dropped_total",
            "Entropy words overwritten before the consumer took them",
        )?;
        let responses_total = IntCounter::new(
            "trust_anchor_puf_responses_total",
            "Challenge responses emitted",
        )?;

        registry.register(Box::new(health_status.clone()))?;
        registry.register(Box::new(entropy_rate_kbps.clone()))?;
        registry.register(Box::new(temperature_celsius.clone()))?;
        registry.register(Box::new(voltage_centivolts.clone()))?;
        registry.register(Box::new(tamper_detected.clone()))?;
        registry.register(Box::new(kill_switch_detected.clone()))?;
        registry.register(Box::new(self_destruct_asserted.clone()))?;
        registry.register(Box::new(ticks_total.clone()))?;
        registry.register(Box::new(words_delivered_total.clone()))?;
        registry.register(Box::new(words_dropped_total.clone()))?;
        registry.register(Box::new(responses_total.clone()))?;

        Ok(Self {
            registry,
            health_status,
            entropy_rate_kbps,
            temperature_celsius,
            voltage_centivolts,
            tamper_detected,
            kill_switch_detected,
            self_destruct_asserted,
            ticks_total,
            words_delivered_total,
            words_dropped_total,
            responses_total,
        })
    }

    /// Updates all metrics from a snapshot.
    pub fn update(&self, snapshot: &MetricsSnapshot) {
        self.health_status.set(i64::from(snapshot.is_healthy));
        self.entropy_rate_kbps.set(i64::from(snapshot.entropy_rate_kbps));
        self.temperature_celsius.set(i64::from(snapshot.temperature_c));
        self.voltage_centivolts.set(i64::from(snapshot.voltage_centivolts));

        self.tamper_detected.set(i64::from(snapshot.tamper_detected));
        self.kill_switch_detected
            .set(i64::from(snapshot.kill_switch_detected));
        self.self_destruct_asserted
            .set(i64::from(snapshot.self_destruct_asserted));

        // Counters only move forward: increment by the difference
        advance(&self.ticks_total, snapshot.ticks);
        advance(&self.words_delivered_total, snapshot.words_delivered);
        advance(&self.words_dropped_total, snapshot.words_dropped);
        advance(&self.responses_total, snapshot.responses_emitted);
    }

    /// Returns the underlying Prometheus registry.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Encodes all metrics in Prometheus text format.
    pub fn encode(&self) -> Result<String, MetricsError> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}

fn advance(counter: &IntCounter, total: u64) {
    let current = counter.get();
    if total > current {
        counter.inc_by(total - current);
    }
}
