//! Per-tick coordination of every trust anchor component.
//!
//! The controller owns the committed register state of the device and
//! advances it one clock tick at a time:
//!
//! ```text
//! noise ─┬─> puf ──────────> response
//!        └─> harvester ─┬──> entropy word
//!                       └──> rate ──┐
//! sensors -> environment ─> tamper ─┼─> health
//!                         └> security ┘
//! ```
//!
//! Every component reads only the previous tick's committed values and
//! this tick's inputs; the one exception is self-destruct, which sees the
//! tamper latch computed from the same reading. The new state is
//! committed as a whole once all components have stepped.

mod inputs;
mod self_test;
mod state;
mod status;

pub use inputs::{ControlInputs, TickInputs};
pub use self_test::SelfTestReport;
pub use state::AnchorState;
pub use status::{Counters, ResponseOutput, StatusSnapshot};

use crate::analysis::QualityThresholds;
use crate::config::{AnchorConfig, ConfigError};
use crate::entropy::{
    EntropyHarvester, EntropySample, HarvestStep, HarvesterState, RateMonitor, RateState,
    WORD_BITS,
};
use crate::environment::{EnvironmentalMonitor, SensorInputs, SensorModel, TamperSupervisor};
use crate::integrity::StateCommitment;
use crate::noise::{NoiseSample, NoiseSource};
use crate::puf::{
    Challenge, ChallengeResponseGenerator, DeviceKeyMaterial, Phase, PufInputs, PufState,
    Response, RESPONSE_LATENCY_TICKS,
};
use crate::security::{HealthAggregator, HealthFault, SecuritySupervisor};
use tracing::{info, warn};

/// Hardware trust anchor.
///
/// Generic over the noise source so that the same device can run on a
/// seeded deterministic source for tests or on OS entropy.
pub struct Controller<N: NoiseSource> {
    noise: N,
    keys: DeviceKeyMaterial,
    generator: ChallengeResponseGenerator,
    harvester: EntropyHarvester,
    rate_monitor: RateMonitor,
    monitor: EnvironmentalMonitor,
    tamper: TamperSupervisor,
    security: SecuritySupervisor,
    health: HealthAggregator,
    state: AnchorState,
    status: StatusSnapshot,
}

impl<N: NoiseSource> Controller<N> {
    /// Builds a controller in its power-on state.
    pub fn new(config: &AnchorConfig, noise: N) -> Result<Self, ConfigError> {
        config.validate()?;

        let keys = DeviceKeyMaterial::derive(&config.device.provisioning_seed);
        let health = HealthAggregator::new(config.health.clone());
        let state = AnchorState::power_on();
        let status = derive_status(&health, &state);

        info!(
            noise = %noise.describe(),
            clock_hz = config.entropy.clock_hz,
            rate_window_ticks = config.entropy.rate_window_ticks,
            backpressure = ?config.entropy.backpressure,
            "Trust anchor powered on"
        );

        Ok(Self {
            generator: ChallengeResponseGenerator::new(keys.clone()),
            harvester: EntropyHarvester::new(config.entropy.backpressure),
            rate_monitor: RateMonitor::new(
                config.entropy.clock_hz,
                config.entropy.rate_window_ticks,
            ),
            monitor: EnvironmentalMonitor::new(config.environment.baseline_temp_c),
            tamper: TamperSupervisor::new(config.environment.clone()),
            security: SecuritySupervisor::new(config.environment.clone()),
            noise,
            keys,
            health,
            state,
            status,
        })
    }

    /// Replaces the sensor model used to turn raw sensor inputs into
    /// readings.
    pub fn with_sensor_model(mut self, model: Box<dyn SensorModel>) -> Self {
        let baseline = self.monitor.baseline_temp_c();
        self.monitor = EnvironmentalMonitor::with_model(baseline, model);
        self
    }

    /// Advances the device by one tick and returns the committed status.
    ///
    /// Exactly one noise sample is drawn per tick and shared by the
    /// generator and the harvester.
    pub fn tick(&mut self, inputs: &TickInputs) -> StatusSnapshot {
        let noise = self.noise.sample();
        let next = self.next_state(&self.state, inputs, &noise);
        let status = derive_status(&self.health, &next);

        if status.healthy != self.status.healthy {
            match self.health.check(&next.health_inputs()) {
                Ok(()) => info!(tick = next.counters.ticks, "Device healthy"),
                Err(fault) => warn!(tick = next.counters.ticks, %fault, "Device unhealthy"),
            }
        }

        self.state = next;
        self.status = status;
        status
    }

    /// Pure next-state function: reads `prev` and this tick's inputs only.
    fn next_state(
        &self,
        prev: &AnchorState,
        inputs: &TickInputs,
        noise: &NoiseSample,
    ) -> AnchorState {
        let control = inputs.control;
        // While self-destruct is asserted the secret-bearing datapath is
        // held cleared, exactly as under reset.
        let clear_datapath = control.reset || prev.security.self_destruct_asserted();

        let reading = self.monitor.measure(&inputs.sensors);
        let tamper = self.tamper.step(prev.tamper, &reading, control.reset);
        let security = self
            .security
            .step(&prev.security, tamper.is_armed(), &reading, &control);

        let (puf, harvest, rate) = if clear_datapath {
            (
                PufState::default(),
                HarvestStep {
                    state: HarvesterState::default(),
                    delivered: false,
                    dropped: false,
                },
                RateState::default(),
            )
        } else {
            let puf = self.generator.step(
                &prev.puf,
                &PufInputs {
                    enable: control.enable,
                    security_lock: control.security_lock,
                    challenge: inputs.challenge,
                },
                noise,
            );
            let harvest =
                self.harvester
                    .step(&prev.harvester, control.enable, inputs.entropy_ready, noise);
            let bits = if harvest.delivered { u32::from(WORD_BITS) } else { 0 };
            let rate = self.rate_monitor.step(&prev.rate, bits);
            (puf, harvest, rate)
        };

        let counters = Counters {
            ticks: prev.counters.ticks + 1,
            words_delivered: prev.counters.words_delivered + u64::from(harvest.delivered),
            words_dropped: prev.counters.words_dropped + u64::from(harvest.dropped),
            responses_emitted: prev.counters.responses_emitted + u64::from(puf.valid()),
        };

        AnchorState {
            puf,
            harvester: harvest.state,
            rate,
            reading,
            tamper,
            security,
            counters,
        }
    }

    /// Returns the status committed by the last tick.
    #[inline]
    pub fn status(&self) -> StatusSnapshot {
        self.status
    }

    /// Returns the challenge-response interface output.
    pub fn response(&self) -> ResponseOutput {
        ResponseOutput {
            response: self.state.puf.response(),
            valid: self.state.puf.valid(),
        }
    }

    /// Returns the entropy stream output.
    pub fn entropy(&self) -> EntropySample {
        self.state.harvester.output()
    }

    /// Returns true if a completed entropy word awaits the consumer.
    pub fn entropy_pending(&self) -> bool {
        self.state.harvester.data_valid()
    }

    /// Returns the activity counters.
    pub fn counters(&self) -> Counters {
        self.state.counters
    }

    /// Number of ticks since power-on.
    pub fn tick_count(&self) -> u64 {
        self.state.counters.ticks
    }

    /// Returns the committed register state.
    pub fn state(&self) -> &AnchorState {
        &self.state
    }

    /// Returns the first failing health condition, if any.
    pub fn health_fault(&self) -> Option<HealthFault> {
        self.health.check(&self.state.health_inputs()).err()
    }

    /// Keyed commitment over the committed register state.
    pub fn commitment(&self) -> StateCommitment {
        StateCommitment::compute(self.keys.commitment_key(), &self.state)
    }

    /// Checks a commitment against the current register state.
    pub fn verify_commitment(&self, commitment: &StateCommitment) -> bool {
        commitment.verify(self.keys.commitment_key(), &self.state)
    }

    /// Presents `challenge` and clocks the device until its response is
    /// emitted.
    ///
    /// A computation already in flight is clocked to completion first, so
    /// the returned response always belongs to `challenge`. Returns `None`
    /// if the challenge was not accepted, which happens while security
    /// lock or self-destruct is in effect.
    pub fn respond(&mut self, challenge: Challenge, sensors: SensorInputs) -> Option<Response> {
        let rest = TickInputs::running().with_ready(false).with_sensors(sensors);

        for _ in 0..=RESPONSE_LATENCY_TICKS {
            if self.state.puf.phase() == Phase::Idle {
                break;
            }
            self.tick(&rest);
        }

        self.tick(&rest.with_challenge(challenge));
        let started = self.state.puf;
        if started.phase() != (Phase::Accumulating { step: 0 }) || started.challenge() != challenge {
            return None;
        }

        for _ in 1..RESPONSE_LATENCY_TICKS {
            self.tick(&rest);
            let output = self.response();
            if output.valid && self.state.puf.challenge() == challenge {
                return Some(output.response);
            }
        }
        None
    }

    /// Runs `windows` complete rate windows with a ready consumer and
    /// nominal sensors, then checks the collected words and the measured
    /// rate.
    ///
    /// The run advances the device like any other ticks; it is meant for
    /// power-on use.
    pub fn self_test(&mut self, windows: u64, thresholds: &QualityThresholds) -> SelfTestReport {
        let inputs = TickInputs::running();
        let ticks = windows.max(1) * self.rate_monitor.window_ticks();
        let mut words = Vec::new();

        for _ in 0..ticks {
            self.tick(&inputs);
            let output = self.entropy();
            if output.valid {
                words.push(output.data);
            }
        }

        let report = SelfTestReport::evaluate(
            &words,
            self.status.entropy_rate_kbps,
            self.health.min_rate_kbps(),
            thresholds,
        );
        if report.passed {
            info!(words = words.len(), rate_kbps = report.rate_kbps, "Self-test passed");
        } else {
            warn!(
                words = words.len(),
                rate_kbps = report.rate_kbps,
                violation = report.violation.as_deref().unwrap_or("rate"),
                "Self-test failed"
            );
        }
        report
    }

    /// Returns a reference to the noise source.
    pub fn noise(&self) -> &N {
        &self.noise
    }
}

impl<N: NoiseSource> std::fmt::Debug for Controller<N> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Controller")
            .field("noise", &self.noise.describe())
            .field("state", &self.state)
            .field("status", &self.status)
            .finish_non_exhaustive()
    }
}

fn derive_status(health: &HealthAggregator, state: &AnchorState) -> StatusSnapshot {
    StatusSnapshot {
        entropy_rate_kbps: state.rate.rate_kbps(),
        temperature_c: state.reading.temperature_c,
        voltage_centivolts: state.reading.voltage_cv,
        tamper_detected: state.tamper.is_armed(),
        healthy: health.is_healthy(&state.health_inputs()),
        kill_switch_detected: state.security.kill_switch_detected(),
        self_destruct_asserted: state.security.self_destruct_asserted(),
    }
}
