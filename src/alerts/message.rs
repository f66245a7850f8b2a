use crate::aggregator::AggregatedMetric;
use crate::events::Timestamp;
use serde::{Deserialize, Serialize};

/// Headline shown on every low-water notification
pub const ALERT_TITLE: &str = ":dog: *Water bowl is running low!*";

/// Content of one low-water notification
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AlertMessage {
    /// When the alert was raised
    pub timestamp: Timestamp,
    /// Window average distance, in centimeters
    pub avg_distance: f64,
    /// Derived water level, in centimeters
    pub water_level: f64,
}

impl AlertMessage {
    pub fn new(metric: &AggregatedMetric, timestamp: Timestamp) -> Self {
        Self {
            timestamp,
            avg_distance: metric.avg_distance,
            water_level: metric.water_level,
        }
    }

    /// Human-readable field lines, in display order
    pub fn fields(&self) -> Vec<String> {
        vec![
            format!(
                "*Time:*  {}",
                self.timestamp.format("%Y-%m-%d %H:%M:%S UTC")
            ),
            format!("*Distance:*  {:.2} CM", self.avg_distance),
            format!("*Waterlevel:*  {:.2} CM", self.water_level),
        ]
    }

    /// Title and fields joined as plain text
    pub fn to_text(&self) -> String {
        let mut text = String::from(ALERT_TITLE);
        for field in self.fields() {
            text.push('\n');
            text.push_str(&field);
        }
        text
    }
}
