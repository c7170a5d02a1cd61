//! Trust anchor configuration.
//!
//! Thresholds and window sizes are fixed per device at provisioning time.
//! Every section has defaults matching the reference device, so a config
//! file only needs to name what it changes.

use crate::entropy::BackpressurePolicy;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Per-device provisioning configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceConfig {
    /// Opaque provisioning seed; all device key material is derived from it.
    pub provisioning_seed: String,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            provisioning_seed: "trust-anchor-reference-device".to_string(),
        }
    }
}

/// Entropy harvester and rate monitor configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EntropyConfig {
    /// Reference clock frequency in Hz (one tick per clock cycle).
    pub clock_hz: u64,
    /// Rate monitoring window length in ticks.
    pub rate_window_ticks: u64,
    /// What the producer does when the consumer is not ready.
    pub backpressure: BackpressurePolicy,
}

impl Default for EntropyConfig {
    fn default() -> Self {
        Self {
            clock_hz: 100_000_000,        // 100 MHz
            rate_window_ticks: 10_000_000, // 100 ms
            backpressure: BackpressurePolicy::Overwrite,
        }
    }
}

/// Environmental limits used for tamper and self-destruct decisions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvironmentLimits {
    /// Temperature reported with a zero sensor offset.
    pub baseline_temp_c: i16,
    /// Tamper fires strictly above this temperature.
    pub tamper_temp_high_c: i16,
    /// Tamper fires strictly below this temperature.
    pub tamper_temp_low_c: i16,
    /// Lowest voltage inside the safe band (inclusive).
    pub safe_voltage_min_cv: u16,
    /// Highest voltage inside the safe band (inclusive).
    pub safe_voltage_max_cv: u16,
    /// Self-destruct temperature, compared strictly above.
    pub critical_temp_c: i16,
    /// Self-destruct voltage, compared strictly below.
    pub critical_voltage_cv: u16,
}

impl Default for EnvironmentLimits {
    fn default() -> Self {
        Self {
            baseline_temp_c: 25,
            tamper_temp_high_c: 85,
            tamper_temp_low_c: -40,
            safe_voltage_min_cv: 140,
            safe_voltage_max_cv: 220,
            critical_temp_c: 100,
            critical_voltage_cv: 120,
        }
    }
}

/// Health aggregation thresholds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthConfig {
    /// Minimum entropy rate for a healthy device.
    pub min_rate_kbps: u32,
    /// Maximum temperature for a healthy device.
    pub max_temp_c: i16,
    /// Minimum voltage for a healthy device.
    pub min_voltage_cv: u16,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            min_rate_kbps: 512,
            max_temp_c: 85,
            min_voltage_cv: 150,
        }
    }
}

/// Complete configuration of one trust anchor.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AnchorConfig {
    /// Device identity.
    pub device: DeviceConfig,
    /// Entropy path timing and backpressure.
    pub entropy: EntropyConfig,
    /// Tamper and self-destruct limits.
    pub environment: EnvironmentLimits,
    /// Health thresholds.
    pub health: HealthConfig,
}

impl AnchorConfig {
    /// Validates the configuration parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.entropy.clock_hz == 0 {
            return Err(ConfigError::InvalidClock);
        }
        if self.entropy.rate_window_ticks == 0 {
            return Err(ConfigError::InvalidRateWindow);
        }
        let env = &self.environment;
        if env.safe_voltage_min_cv > env.safe_voltage_max_cv {
            return Err(ConfigError::InvalidVoltageBand {
                min: env.safe_voltage_min_cv,
                max: env.safe_voltage_max_cv,
            });
        }
        if env.tamper_temp_low_c >= env.tamper_temp_high_c {
            return Err(ConfigError::InvalidTemperatureLimits {
                low: env.tamper_temp_low_c,
                high: env.tamper_temp_high_c,
            });
        }
        if self.device.provisioning_seed.is_empty() {
            return Err(ConfigError::EmptyProvisioningSeed);
        }
        Ok(())
    }

    /// Shrinks the rate window so that tests and demos reach a rate
    /// measurement quickly. The clock is left unchanged.
    pub fn with_rate_window(mut self, ticks: u64) -> Self {
        self.entropy.rate_window_ticks = ticks;
        self
    }
}

/// Configuration validation errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    /// Clock frequency is zero.
    #[error("invalid clock frequency (must be non-zero)")]
    InvalidClock,
    /// Rate window is zero ticks.
    #[error("invalid rate window (must be at least one tick)")]
    InvalidRateWindow,
    /// Voltage band is empty.
    #[error("invalid safe voltage band: min {min} cV above max {max} cV")]
    InvalidVoltageBand { min: u16, max: u16 },
    /// Temperature limits are inverted.
    #[error("invalid tamper temperature limits: low {low} C not below high {high} C")]
    InvalidTemperatureLimits { low: i16, high: i16 },
    /// No provisioning seed.
    #[error("provisioning seed must not be empty")]
    EmptyProvisioningSeed,
    /// Config file could not be read.
    #[error("failed to read config file: {0}")]
    FileReadError(String),
    /// Config file is not valid TOML.
    #[error("failed to parse config file: {0}")]
    ParseError(String),
}

/// Simulation run settings for the command-line tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Run until interrupted (true) or for a fixed number of ticks (false).
    pub continuous: bool,
    /// Number of ticks to simulate if not continuous.
    pub ticks: u64,
    /// Noise seed; `None` binds to the OS entropy device.
    pub seed: Option<u64>,
    /// Metrics server port (0 to disable).
    pub metrics_port: u16,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            continuous: false,
            ticks: 100_000,
            seed: Some(42),
            metrics_port: 9090,
        }
    }
}

/// Full configuration file format.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FileConfig {
    /// Device configuration.
    #[serde(default)]
    pub anchor: AnchorConfig,
    /// CLI run settings.
    #[serde(default)]
    pub output: OutputConfig,
}

impl FileConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::FileReadError(e.to_string()))?;
        Self::from_toml(&content)
    }

    /// Parses configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: FileConfig =
            toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.anchor.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_valid() {
        let config = AnchorConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_window_invalid() {
        let config = AnchorConfig::default().with_rate_window(0);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidRateWindow)
        ));
    }

    #[test]
    fn test_inverted_voltage_band_invalid() {
        let mut config = AnchorConfig::default();
        config.environment.safe_voltage_min_cv = 300;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidVoltageBand { min: 300, .. })
        ));
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let toml = r#"
            [anchor.entropy]
            rate_window_ticks = 5000
            backpressure = "stall"

            [anchor.health]
            min_rate_kbps = 1024

            [output]
            ticks = 10
        "#;
        let config = FileConfig::from_toml(toml).unwrap();

        assert_eq!(config.anchor.entropy.rate_window_ticks, 5000);
        assert_eq!(config.anchor.entropy.clock_hz, 100_000_000);
        assert_eq!(config.anchor.entropy.backpressure, BackpressurePolicy::Stall);
        assert_eq!(config.anchor.health.min_rate_kbps, 1024);
        assert_eq!(config.anchor.health.max_temp_c, 85);
        assert_eq!(config.anchor.environment.tamper_temp_low_c, -40);
        assert_eq!(config.output.ticks, 10);
        assert_eq!(config.output.seed, Some(42));
    }

    #[test]
    fn test_invalid_file_rejected() {
        let toml = r#"
            [anchor.entropy]
            clock_hz = 0
        "#;
        assert!(matches!(
            FileConfig::from_toml(toml),
            Err(ConfigError::InvalidClock)
        ));
    }

    #[test]
    fn test_malformed_toml_is_parse_error() {
        assert!(matches!(
            FileConfig::from_toml("[anchor"),
            Err(ConfigError::ParseError(_))
        ));
    }
}
