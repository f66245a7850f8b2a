//! Core value types shared across the monitor
//!
//! A [`Reading`] is one raw sample from the distance sensor. [`SensorPayload`]
//! is the JSON shape the sensor firmware serves and is converted into a
//! reading as soon as it is received.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Timestamp type for consistent time handling across the application
pub type Timestamp = DateTime<Utc>;

/// One raw sensor sample
///
/// Readings are immutable once built. The history buffer takes ownership of
/// each reading after it is pushed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Reading {
    /// Distance from the sensor to the water surface, in centimeters
    pub distance: f64,
    /// When the sample was taken
    pub timestamp: Timestamp,
    /// Sensor identifier reported by the firmware, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sensor_id: Option<i32>,
}

impl Reading {
    pub fn new(distance: f64, timestamp: Timestamp) -> Self {
        Self {
            distance,
            timestamp,
            sensor_id: None,
        }
    }
}

/// Wire format served by the sensor's HTTP endpoint
///
/// Only `distance` is required. Any other field the firmware adds is ignored.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct SensorPayload {
    pub distance: f64,
    #[serde(default, rename = "sensorId")]
    pub sensor_id: Option<i32>,
    #[serde(default)]
    pub time: Option<Timestamp>,
}

impl SensorPayload {
    /// Convert into a reading, stamping it with `fetched_at` unless the
    /// payload carries its own time.
    pub fn into_reading(self, fetched_at: Timestamp) -> Reading {
        Reading {
            distance: self.distance,
            timestamp: self.time.unwrap_or(fetched_at),
            sensor_id: self.sensor_id,
        }
    }
}
