//! Configuration loading — TOML file with environment variable overrides.
//!
//! Looks for `cabinhub.toml` in the working directory, or the file named by
//! `CABINHUB_CONFIG`. Every field has a sensible default so the file is
//! optional. Environment variables take precedence over file values.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use cabinhub_adapter_pwm_sysfs::SysfsPwmConfig;
use cabinhub_app::coordinator::MotionTimings;
use cabinhub_app::scheduler::DeviceChannels;
use cabinhub_app::watchdog::WatchdogTimings;
use cabinhub_domain::device::RelayChannel;
use cabinhub_domain::forecast::DailyForecast;
use cabinhub_domain::settings::{
    AutomationSettings, CoveringSettings, HeatingSettings, PresenceSettings,
};
use serde::Deserialize;

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Automation cycle settings.
    pub scheduler: SchedulerConfig,
    /// Covering fleet and output driver.
    pub actuators: ActuatorsConfig,
    /// Relay sockets for heater and devices.
    pub relay: RelayConfig,
    /// Heating rule.
    pub heating: HeatingSettings,
    /// Occupancy rule.
    pub presence: PresenceSettings,
    /// Covering rules.
    pub coverings: CoveringSettings,
    /// Values returned by the simulated sensors.
    pub simulation: SimulationConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
}

/// Automation cycle configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Seconds between two automation cycles.
    pub period_secs: u64,
}

/// Which PWM output implementation drives the servos.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Driver {
    /// In-memory outputs, no hardware.
    #[default]
    Simulated,
    /// Linux sysfs PWM channels.
    Sysfs,
}

impl fmt::Display for Driver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Simulated => "simulated",
            Self::Sysfs => "sysfs",
        })
    }
}

impl FromStr for Driver {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "simulated" => Ok(Self::Simulated),
            "sysfs" => Ok(Self::Sysfs),
            other => Err(ConfigError::Validation(format!(
                "unknown actuator driver '{other}'"
            ))),
        }
    }
}

/// Actuator fleet configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ActuatorsConfig {
    pub driver: Driver,
    /// Seconds an output stays energized after a command.
    pub idle_timeout_secs: u64,
    /// Milliseconds between watchdog and settle checks.
    pub poll_interval_ms: u64,
    /// Seconds before a settle wait is declared failed.
    pub settle_timeout_secs: u64,
    /// Coverings in wiring order.
    pub coverings: Vec<CoveringConfig>,
    /// Only used by the `sysfs` driver.
    pub sysfs: SysfsPwmConfig,
}

/// One covering and the output channel it is wired to.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CoveringConfig {
    pub name: String,
    pub channel: u8,
}

/// Relay socket assignment.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct RelayConfig {
    pub heater: u8,
    pub devices: u8,
}

/// Simulated sensor values.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Temperature reading; absent simulates a failing sensor.
    pub temperature: Option<f64>,
    /// Full-spectrum light level.
    pub light: f64,
    /// Forecast; absent simulates a provider without API key.
    pub forecast: Option<DailyForecast>,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
    /// Records kept by the in-memory event log.
    pub event_log_capacity: usize,
}

impl Config {
    /// Load configuration from `cabinhub.toml` (or `CABINHUB_CONFIG`) if
    /// present, then apply environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, or if the
    /// resulting configuration is invalid.
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var("CABINHUB_CONFIG").unwrap_or_else(|_| "cabinhub.toml".to_string());
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
        if let Some(val) = lookup("CABINHUB_ACTUATOR_DRIVER") {
            self.actuators.driver = val.parse()?;
        }
        if let Some(val) = lookup("CABINHUB_LOG") {
            self.logging.filter = val;
        }
        if let Some(val) = lookup("RUST_LOG") {
            self.logging.filter = val;
        }
        Ok(())
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.scheduler.period_secs == 0 {
            return invalid("scheduler period must be non-zero");
        }
        if self.actuators.poll_interval_ms == 0 {
            return invalid("actuator poll interval must be non-zero");
        }
        if self.actuators.idle_timeout() < self.actuators.poll_interval() {
            return invalid("idle timeout must be at least one poll interval");
        }
        if self.actuators.settle_timeout() <= self.actuators.idle_timeout() {
            return invalid("settle timeout must exceed the idle timeout");
        }
        if self.actuators.coverings.is_empty() {
            return invalid("at least one covering must be configured");
        }
        let mut channels = HashSet::new();
        for covering in &self.actuators.coverings {
            if !channels.insert(covering.channel) {
                return invalid(format!("output channel {} used twice", covering.channel));
            }
        }
        if self.relay.heater == self.relay.devices {
            return invalid("heater and devices must use different relay channels");
        }
        let limits = self.heating.limits;
        let desired = self.heating.desired_temp;
        if !(limits.lower < desired && desired < limits.upper) {
            return invalid(format!(
                "desired temperature {desired} must lie strictly between {} and {}",
                limits.lower, limits.upper
            ));
        }
        if self.heating.margin < 0.0 {
            return invalid("heating margin must not be negative");
        }
        if self.presence.timeout_cycles == 0 {
            return invalid("presence timeout must be at least one cycle");
        }
        Ok(())
    }

    /// Settings shared by the scheduler and the control service.
    #[must_use]
    pub fn automation_settings(&self) -> AutomationSettings {
        AutomationSettings {
            heating: self.heating.clone(),
            presence: self.presence.clone(),
            coverings: self.coverings.clone(),
        }
    }

    #[must_use]
    pub fn device_channels(&self) -> DeviceChannels {
        DeviceChannels {
            heater: RelayChannel(self.relay.heater),
            devices: RelayChannel(self.relay.devices),
        }
    }
}

impl SchedulerConfig {
    #[must_use]
    pub fn period(&self) -> Duration {
        Duration::from_secs(self.period_secs)
    }
}

impl ActuatorsConfig {
    #[must_use]
    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_secs)
    }

    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    #[must_use]
    pub fn settle_timeout(&self) -> Duration {
        Duration::from_secs(self.settle_timeout_secs)
    }

    #[must_use]
    pub fn watchdog_timings(&self) -> WatchdogTimings {
        WatchdogTimings {
            idle_timeout: self.idle_timeout(),
            poll_interval: self.poll_interval(),
        }
    }

    #[must_use]
    pub fn motion_timings(&self) -> MotionTimings {
        MotionTimings {
            poll_interval: self.poll_interval(),
            settle_timeout: self.settle_timeout(),
        }
    }
}

fn invalid(message: impl Into<String>) -> Result<(), ConfigError> {
    Err(ConfigError::Validation(message.into()))
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self { period_secs: 60 }
    }
}

impl Default for ActuatorsConfig {
    fn default() -> Self {
        let coverings = ["left", "leftdoor", "rightdoor", "right"]
            .iter()
            .zip(0u8..)
            .map(|(name, channel)| CoveringConfig {
                name: (*name).to_string(),
                channel,
            })
            .collect();
        Self {
            driver: Driver::Simulated,
            idle_timeout_secs: 15,
            poll_interval_ms: 1000,
            settle_timeout_secs: 120,
            coverings,
            sysfs: SysfsPwmConfig::default(),
        }
    }
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            heater: 1,
            devices: 2,
        }
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            temperature: Some(19.0),
            light: 800_000.0,
            forecast: None,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "cabinhubd=info,cabinhub_app=info,cabinhub_adapter_virtual=info,cabinhub_adapter_pwm_sysfs=info".to_string(),
            event_log_capacity: 256,
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
