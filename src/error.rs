use thiserror::Error;

/// Errors that can occur while fetching a reading from the sensor
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SampleError {
    #[error("Sensor unreachable: {0}")]
    Transport(String),

    #[error("Malformed sensor payload: {0}")]
    Format(String),
}

impl From<reqwest::Error> for SampleError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            SampleError::Format(err.to_string())
        } else {
            SampleError::Transport(err.to_string())
        }
    }
}

/// Errors that can occur when delivering alerts
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AlertError {
    #[error("Failed to deliver notification: {0}")]
    DeliveryFailed(String),

    #[error("Notifier is not configured: {0}")]
    NotConfigured(String),
}

/// Errors that can occur during configuration loading
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(String),

    #[error("Invalid configuration value: {0}")]
    ValidationError(String),

    #[error("TOML parse error: {0}")]
    TomlError(#[from] toml::de::Error),
}
