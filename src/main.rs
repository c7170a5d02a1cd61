//! Trust Anchor CLI
//!
//! Command-line interface for simulating the trust anchor, answering
//! challenges and running the power-on self-test.

use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{error, info, warn};
use trust_anchor::{
    metrics::{MetricsRegistry, MetricsSnapshot},
    Challenge, Controller, Counters, FileConfig, NoiseSource, OsNoise, QualityThresholds,
    SeededNoise, SelfTestReport, SensorInputs, StatusSnapshot, TickInputs,
};

/// Ticks between progress log lines and metrics updates.
const REPORT_INTERVAL: u64 = 1_000_000;

#[derive(Parser)]
#[command(name = "trust-anchor", version, about = "Hardware trust anchor simulator")]
struct Cli {
    /// TOML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Clock the device with a running entropy consumer and print a report
    Run {
        /// Number of ticks to simulate
        #[arg(short, long)]
        ticks: Option<u64>,
        /// Run until interrupted with Ctrl-C
        #[arg(long)]
        continuous: bool,
        #[command(flatten)]
        noise: NoiseArgs,
        /// Trip a tamper sensor for one tick at this tick number
        #[arg(long)]
        tamper_at: Option<u64>,
        /// Override the rate window length in ticks
        #[arg(long)]
        rate_window: Option<u64>,
        /// Metrics server port (0 disables; needs the `metrics` feature)
        #[arg(long)]
        metrics_port: Option<u16>,
    },
    /// Compute the response to a challenge
    Challenge {
        /// 128-bit challenge as 32 hex digits
        challenge: Challenge,
        #[command(flatten)]
        noise: NoiseArgs,
    },
    /// Run the power-on entropy self-test
    SelfTest {
        /// Number of complete rate windows to run
        #[arg(short, long, default_value_t = 10)]
        windows: u64,
        #[command(flatten)]
        noise: NoiseArgs,
        /// Override the rate window length in ticks
        #[arg(long)]
        rate_window: Option<u64>,
    },
}

#[derive(clap::Args)]
struct NoiseArgs {
    /// Seed for the deterministic noise source
    #[arg(short, long)]
    seed: Option<u64>,
    /// Draw noise from the operating system instead of a seed
    #[arg(long, conflicts_with = "seed")]
    os_noise: bool,
}

impl NoiseArgs {
    fn source(&self, default_seed: Option<u64>) -> Box<dyn NoiseSource> {
        if self.os_noise {
            return Box::new(OsNoise::new());
        }
        match self.seed.or(default_seed) {
            Some(seed) => Box::new(SeededNoise::new(seed)),
            None => Box::new(OsNoise::new()),
        }
    }
}

#[derive(Serialize)]
struct RunReport {
    generated_at: DateTime<Utc>,
    version: &'static str,
    noise: String,
    commitment: String,
    status: StatusSnapshot,
    counters: Counters,
}

fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let file_config = match &cli.config {
        Some(path) => match FileConfig::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Failed to load {}: {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => FileConfig::default(),
    };

    info!("Trust Anchor v{}", trust_anchor::VERSION);

    let code = match cli.command {
        Command::Run {
            ticks,
            continuous,
            noise,
            tamper_at,
            rate_window,
            metrics_port,
        } => {
            let mut config = file_config;
            if let Some(ticks) = ticks {
                config.output.ticks = ticks;
            }
            config.output.continuous |= continuous;
            if let Some(port) = metrics_port {
                config.output.metrics_port = port;
            }
            if let Some(window) = rate_window {
                config.anchor = config.anchor.with_rate_window(window);
            }
            run(&config, &noise, tamper_at)
        }
        Command::Challenge { challenge, noise } => {
            answer(&file_config, &noise, challenge)
        }
        Command::SelfTest {
            windows,
            noise,
            rate_window,
        } => {
            let mut config = file_config;
            if let Some(window) = rate_window {
                config.anchor = config.anchor.with_rate_window(window);
            }
            self_test(&config, &noise, windows)
        }
    };

    std::process::exit(code);
}

fn build(config: &FileConfig, noise: &NoiseArgs) -> Option<Controller<Box<dyn NoiseSource>>> {
    match Controller::new(&config.anchor, noise.source(config.output.seed)) {
        Ok(controller) => Some(controller),
        Err(e) => {
            eprintln!("Invalid configuration: {}", e);
            None
        }
    }
}

fn run(config: &FileConfig, noise: &NoiseArgs, tamper_at: Option<u64>) -> i32 {
    let Some(mut anchor) = build(config, noise) else {
        return 1;
    };

    let running = Arc::new(AtomicBool::new(true));
    if config.output.continuous {
        let flag = Arc::clone(&running);
        if let Err(e) = ctrlc::set_handler(move || flag.store(false, Ordering::SeqCst)) {
            warn!("Failed to install Ctrl-C handler: {}", e);
        }
        info!("Running continuously, press Ctrl-C to stop");
    } else {
        info!(ticks = config.output.ticks, "Simulating");
    }

    let registry = match MetricsRegistry::new() {
        Ok(registry) => registry,
        Err(e) => {
            eprintln!("Failed to create metrics registry: {}", e);
            return 1;
        }
    };
    let publisher = MetricsPublisher::start(registry, config.output.metrics_port);

    let nominal = TickInputs::running();
    let tampered = nominal.with_sensors(SensorInputs::with_tamper_mask(1));

    loop {
        let tick = anchor.tick_count();
        if config.output.continuous {
            if !running.load(Ordering::SeqCst) {
                break;
            }
        } else if tick >= config.output.ticks {
            break;
        }

        let inputs = if tamper_at == Some(tick) { &tampered } else { &nominal };
        let status = anchor.tick(inputs);

        if anchor.tick_count() % REPORT_INTERVAL == 0 {
            info!(
                tick = anchor.tick_count(),
                rate_kbps = status.entropy_rate_kbps,
                healthy = status.healthy,
                "Progress"
            );
            publisher.publish(&MetricsSnapshot::from_status(&status, &anchor.counters()));
        }
    }

    let status = anchor.status();
    publisher.publish(&MetricsSnapshot::from_status(&status, &anchor.counters()));

    let report = RunReport {
        generated_at: Utc::now(),
        version: trust_anchor::VERSION,
        noise: anchor.noise().describe(),
        commitment: anchor.commitment().to_string(),
        status,
        counters: anchor.counters(),
    };
    print_toml(&report);

    if status.self_destruct_asserted {
        error!("Run ended with self-destruct asserted");
    } else if let Some(fault) = anchor.health_fault() {
        warn!(%fault, "Run ended unhealthy");
    }
    0
}

fn answer(config: &FileConfig, noise: &NoiseArgs, challenge: Challenge) -> i32 {
    let Some(mut anchor) = build(config, noise) else {
        return 1;
    };

    match anchor.respond(challenge, SensorInputs::NOMINAL) {
        Some(response) => {
            println!("{}", response);
            0
        }
        None => {
            eprintln!("No response produced for challenge {}", challenge);
            1
        }
    }
}

fn self_test(config: &FileConfig, noise: &NoiseArgs, windows: u64) -> i32 {
    let Some(mut anchor) = build(config, noise) else {
        return 1;
    };

    let report: SelfTestReport = anchor.self_test(windows, &QualityThresholds::default());
    print_toml(&report);

    if report.passed {
        0
    } else {
        2
    }
}

fn print_toml<T: Serialize>(value: &T) {
    match toml::to_string(value) {
        Ok(text) => print!("{}", text),
        Err(e) => eprintln!("Failed to encode report: {}", e),
    }
}

/// Pushes snapshots to the registry, served over HTTP when the `metrics`
/// feature is enabled and a port is configured.
struct MetricsPublisher {
    registry: Option<MetricsRegistry>,
    #[cfg(feature = "metrics")]
    shared: Option<Arc<tokio::sync::RwLock<trust_anchor::metrics::MetricsState>>>,
}

impl MetricsPublisher {
    #[cfg(feature = "metrics")]
    fn start(registry: MetricsRegistry, port: u16) -> Self {
        use trust_anchor::metrics::{MetricsServer, MetricsServerConfig};

        if port == 0 {
            return Self {
                registry: Some(registry),
                shared: None,
            };
        }

        let server = MetricsServer::new(MetricsServerConfig::with_port(port), registry);
        let shared = server.state();
        std::thread::spawn(move || {
            let runtime = match tokio::runtime::Runtime::new() {
                Ok(runtime) => runtime,
                Err(e) => {
                    error!("Failed to start metrics runtime: {}", e);
                    return;
                }
            };
            if let Err(e) = runtime.block_on(server.run()) {
                error!("Metrics server stopped: {}", e);
            }
        });

        Self {
            registry: None,
            shared: Some(shared),
        }
    }

    #[cfg(not(feature = "metrics"))]
    fn start(registry: MetricsRegistry, port: u16) -> Self {
        if port != 0 {
            info!(port, "Metrics server not built in (enable the `metrics` feature)");
        }
        Self {
            registry: Some(registry),
        }
    }

    fn publish(&self, snapshot: &MetricsSnapshot) {
        #[cfg(feature = "metrics")]
        if let Some(shared) = &self.shared {
            shared.blocking_write().update(snapshot);
        }
        if let Some(registry) = &self.registry {
            registry.update(snapshot);
        }
    }
}
