/// Error types for the bowl monitor
pub mod error;

/// Core value types
pub mod events;

/// Sensor sample sources
pub mod collectors;

/// Rolling history and window aggregation
pub mod aggregator;

/// Alert decision and cooldown
pub mod alerts;

/// Alert delivery channels
pub mod notifiers;

/// Configuration management
pub mod config;

/// Self-monitoring counters
pub mod monitoring;

/// The poll loop that ties everything together
pub mod monitor;

#[cfg(test)]
mod test_support;

// Re-export commonly used types
pub use error::{AlertError, ConfigError, SampleError};
pub use monitor::{BowlMonitor, CycleOutcome};
