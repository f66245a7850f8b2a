//! Configuration loading and validation
//!
//! Every field has a default, so an empty file (or no file) yields a working
//! configuration for a standard 10.5cm bowl.

use crate::alerts::AlertBand;
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Largest accepted `window.size`
pub const MAX_WINDOW_SIZE: usize = 1000;

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub sensor: SensorConfig,
    pub schedule: ScheduleConfig,
    pub window: WindowConfig,
    pub bowl: BowlConfig,
    pub alerts: AlertsConfig,
    pub slack: SlackConfig,
}

/// Where and how to reach the sensor
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SensorConfig {
    /// Sensor JSON endpoint
    pub url: String,
    /// Per-request timeout
    pub timeout_seconds: u64,
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            url: "http://192.168.101.21:8080/".to_string(),
            timeout_seconds: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ScheduleConfig {
    /// Time between two sensor queries
    pub poll_interval_seconds: u64,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            poll_interval_seconds: 60,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WindowConfig {
    /// Number of readings averaged together
    pub size: usize,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self { size: 5 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BowlConfig {
    /// Distance from the sensor to the bottom of the empty bowl
    pub max_depth_cm: f64,
}

impl Default for BowlConfig {
    fn default() -> Self {
        Self { max_depth_cm: 10.5 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AlertsConfig {
    /// Average distance above which the bowl needs a refill
    pub min_distance_cm: f64,
    /// Average distance at which the bowl is assumed off the stand
    pub max_distance_cm: f64,
    /// Minimum time between two alerts
    pub cooldown_seconds: u64,
}

impl Default for AlertsConfig {
    fn default() -> Self {
        Self {
            min_distance_cm: 10.0,
            max_distance_cm: 11.5,
            cooldown_seconds: 3600,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SlackConfig {
    /// Incoming webhook URL; empty disables Slack delivery
    pub webhook_url: String,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load and validate configuration from a TOML file
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ReadError` if the file cannot be read,
    /// `ConfigError::TomlError` if it is not valid TOML, and
    /// `ConfigError::ValidationError` if a value is out of range.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::ReadError(format!("{}: {}", path.display(), e)))?;
        Self::from_toml_str(&contents)
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.alerts.min_distance_cm >= self.alerts.max_distance_cm {
            return Err(ConfigError::ValidationError(format!(
                "alerts.min_distance_cm ({}) must be below alerts.max_distance_cm ({})",
                self.alerts.min_distance_cm, self.alerts.max_distance_cm
            )));
        }

        if self.window.size == 0 || self.window.size > MAX_WINDOW_SIZE {
            return Err(ConfigError::ValidationError(format!(
                "window.size ({}) must be between 1 and {}",
                self.window.size, MAX_WINDOW_SIZE
            )));
        }

        if self.checked_cooldown().is_none() {
            return Err(ConfigError::ValidationError(format!(
                "alerts.cooldown_seconds ({}) is out of range",
                self.alerts.cooldown_seconds
            )));
        }

        if self.schedule.poll_interval_seconds == 0 {
            return Err(ConfigError::ValidationError(
                "schedule.poll_interval_seconds must be positive".to_string(),
            ));
        }

        if self.sensor.url.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "sensor.url must not be empty".to_string(),
            ));
        }

        Ok(())
    }

    pub fn alert_band(&self) -> AlertBand {
        AlertBand::new(self.alerts.min_distance_cm, self.alerts.max_distance_cm)
    }

    /// Cooldown as a duration, saturating for values `validate` rejects
    pub fn cooldown(&self) -> chrono::Duration {
        self.checked_cooldown().unwrap_or(chrono::Duration::MAX)
    }

    fn checked_cooldown(&self) -> Option<chrono::Duration> {
        i64::try_from(self.alerts.cooldown_seconds)
            .ok()
            .and_then(chrono::Duration::try_seconds)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.schedule.poll_interval_seconds)
    }

    pub fn sensor_timeout(&self) -> Duration {
        Duration::from_secs(self.sensor.timeout_seconds)
    }
}
