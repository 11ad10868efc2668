//! Configuration loading — TOML file with environment variable overrides.
//!
//! Looks for `hwbridge.toml` in the working directory, or at the path given
//! by `HWBRIDGE_CONFIG`. Every field has a default matching the stock
//! hardware, so the file is optional. Environment variables take precedence
//! over file values.

use std::time::Duration;

use serde::Deserialize;

use hwbridge_adapter_dbus::BusKind;
use hwbridge_app::bridge::BridgeSettings;
use hwbridge_domain::channel::OutputChannelMap;
use hwbridge_domain::target::ServiceTarget;

const DEFAULT_PATH: &str = "hwbridge.toml";

/// Upper bound for every period in the configuration, in seconds (one day).
const MAX_PERIOD_SECS: u64 = 86_400;

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Message bus and control service coordinates.
    pub bus: BusConfig,
    /// Actuator outputs.
    pub outputs: OutputsConfig,
    /// Sensors and polling.
    pub sensors: SensorsConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
}

/// Message bus configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct BusConfig {
    /// `system` or `session`.
    pub kind: BusKind,
    /// Service name, object path, interface and member names.
    #[serde(flatten)]
    pub target: ServiceTarget,
    /// Seconds before retrying a failed subscription; `0` waits for the
    /// service to reappear instead.
    pub resubscribe_retry_secs: u64,
}

/// Which output driver switches the actuators.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputDriverKind {
    #[default]
    Pinctrl,
    Virtual,
}

/// Actuator output configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct OutputsConfig {
    pub driver: OutputDriverKind,
    /// Path or name of the pin control tool.
    pub pinctrl_program: String,
    /// Actuator name → channel id.
    pub channels: OutputChannelMap,
}

/// One BME680 chip.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Bme680Config {
    /// I2C character device.
    pub device: String,
    /// 7-bit slave address.
    pub address: u16,
}

/// Sensor configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SensorsConfig {
    /// Seconds between two polls.
    pub poll_interval_secs: u64,
    /// Add a fixed-value virtual sensor.
    pub virtual_enabled: bool,
    pub bme680: Vec<Bme680Config>,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

impl Config {
    /// Load configuration from `hwbridge.toml` (or `HWBRIDGE_CONFIG`), then
    /// apply environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, or if the
    /// resulting configuration is invalid.
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var("HWBRIDGE_CONFIG").unwrap_or_else(|_| DEFAULT_PATH.to_string());
        let mut config = Self::from_file(&path)?;
        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn apply_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(val) = lookup("HWBRIDGE_LOG") {
            self.logging.filter = val;
        }
        if let Some(val) = lookup("RUST_LOG") {
            self.logging.filter = val;
        }
        if let Some(val) = lookup("HWBRIDGE_BUS") {
            self.bus.kind = BusKind::from_name(&val).ok_or_else(|| {
                ConfigError::Validation(format!("unknown bus {val:?}, expected system or session"))
            })?;
        }
        if let Some(val) = lookup("HWBRIDGE_SERVICE") {
            self.bus.target.service_name = val;
        }
        Ok(())
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.sensors.poll_interval_secs == 0 {
            return Err(ConfigError::Validation(
                "poll_interval_secs must be non-zero".to_string(),
            ));
        }

        let periods = [
            ("sensors.poll_interval_secs", self.sensors.poll_interval_secs),
            ("bus.resubscribe_retry_secs", self.bus.resubscribe_retry_secs),
        ];
        if let Some((field, _)) = periods.iter().find(|(_, secs)| *secs > MAX_PERIOD_SECS) {
            return Err(ConfigError::Validation(format!(
                "{field} must not exceed {MAX_PERIOD_SECS}"
            )));
        }

        let target = &self.bus.target;
        let names = [
            ("service_name", &target.service_name),
            ("object_path", &target.object_path),
            ("interface", &target.interface),
            ("signal", &target.signal),
            ("measurement_method", &target.measurement_method),
        ];
        if let Some((field, _)) = names.iter().find(|(_, value)| value.trim().is_empty()) {
            return Err(ConfigError::Validation(format!("bus.{field} must not be empty")));
        }

        if self.outputs.driver == OutputDriverKind::Pinctrl
            && self.outputs.pinctrl_program.trim().is_empty()
        {
            return Err(ConfigError::Validation(
                "outputs.pinctrl_program must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Runtime parameters for the bridge.
    #[must_use]
    pub fn bridge_settings(&self) -> BridgeSettings {
        BridgeSettings {
            target: self.bus.target.clone(),
            channels: self.outputs.channels.clone(),
            poll_interval: Duration::from_secs(self.sensors.poll_interval_secs),
            resubscribe_retry: (self.bus.resubscribe_retry_secs > 0)
                .then(|| Duration::from_secs(self.bus.resubscribe_retry_secs)),
        }
    }
}

impl Default for OutputsConfig {
    fn default() -> Self {
        Self {
            driver: OutputDriverKind::default(),
            pinctrl_program: hwbridge_adapter_pinctrl::DEFAULT_PROGRAM.to_string(),
            channels: OutputChannelMap::default(),
        }
    }
}

impl Default for Bme680Config {
    fn default() -> Self {
        Self {
            device: "/dev/i2c-1".to_string(),
            address: 0x77,
        }
    }
}

impl Default for SensorsConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: 5,
            virtual_enabled: false,
            bme680: vec![Bme680Config::default()],
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "hwbridged=info,hwbridge=info".to_string(),
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}
