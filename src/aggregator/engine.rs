//! Rolling average and water level derivation
//!
//! The engine is a pure function of the history buffer: it only yields a
//! metric once the buffer is full, so every average is taken over exactly
//! `capacity` readings.

use crate::aggregator::HistoryBuffer;
use crate::events::Timestamp;
use serde::{Deserialize, Serialize};

/// Smoothed measurement derived from a full history window
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct AggregatedMetric {
    /// Arithmetic mean of the window's distances, in centimeters
    pub avg_distance: f64,
    /// Bowl depth minus the average distance, in centimeters
    pub water_level: f64,
}

/// Computes [`AggregatedMetric`]s from a [`HistoryBuffer`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AggregationEngine {
    /// Distance from the sensor to the bottom of the empty bowl
    max_depth: f64,
}

impl AggregationEngine {
    pub fn new(max_depth: f64) -> Self {
        Self { max_depth }
    }

    pub fn max_depth(&self) -> f64 {
        self.max_depth
    }

    /// Compute the window average and water level
    ///
    /// Returns `None` during warm-up, while the buffer holds fewer readings
    /// than its capacity.
    ///
    /// # Examples
    ///
    /// ```
    /// use bowlwatch::aggregator::{AggregationEngine, HistoryBuffer};
    /// use bowlwatch::events::Reading;
    /// use chrono::Utc;
    ///
    /// let engine = AggregationEngine::new(10.5);
    /// let mut buffer = HistoryBuffer::new(2);
    /// buffer.push(Reading::new(10.0, Utc::now()));
    /// assert!(engine.compute(&buffer).is_none());
    ///
    /// buffer.push(Reading::new(10.0, Utc::now()));
    /// let metric = engine.compute(&buffer).unwrap();
    /// assert_eq!(metric.avg_distance, 10.0);
    /// ```
    pub fn compute(&self, buffer: &HistoryBuffer) -> Option<AggregatedMetric> {
        if !buffer.is_full() {
            return None;
        }

        let total: f64 = buffer.iter().map(|r| r.distance).sum();
        let avg_distance = total / buffer.capacity() as f64;

        Some(AggregatedMetric {
            avg_distance,
            water_level: self.max_depth - avg_distance,
        })
    }

    /// Render a one-line summary of the window for the log
    ///
    /// Distances are listed newest first as `Q1..QN`.
    pub fn report(
        &self,
        buffer: &HistoryBuffer,
        metric: &AggregatedMetric,
        last_alert_at: Option<Timestamp>,
    ) -> String {
        let time = buffer
            .latest()
            .map(|r| r.timestamp.format("%Y-%m-%d %H:%M:%S UTC").to_string())
            .unwrap_or_default();

        let queries: Vec<String> = buffer
            .iter()
            .enumerate()
            .map(|(i, r)| format!("Q{}: {:4.2}", i + 1, r.distance))
            .collect();

        let last_alert = last_alert_at
            .map(|t| t.format("%H:%M:%S UTC").to_string())
            .unwrap_or_else(|| "never".to_string());

        format!(
            "Time: {:>20}  {}  Avg Dist: {:4.2}CM  WaterLevel: {:4.2}CM  LastAlert: {}",
            time,
            queries.join(" "),
            metric.avg_distance,
            metric.water_level,
            last_alert
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::Reading;
    use chrono::{Duration, TimeZone, Utc};

    fn filled_buffer(distances_oldest_first: &[f64]) -> HistoryBuffer {
        let base = Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap();
        let mut buffer = HistoryBuffer::new(distances_oldest_first.len());
        for (i, d) in distances_oldest_first.iter().enumerate() {
            buffer.push(Reading::new(*d, base + Duration::minutes(i as i64)));
        }
        buffer
    }

    #[test]
    fn test_five_reading_window_average() {
        let buffer = filled_buffer(&[10.0, 10.2, 10.1, 9.9, 10.3]);
        let engine = AggregationEngine::new(10.5);

        let metric = engine.compute(&buffer).unwrap();
        assert!((metric.avg_distance - 10.1).abs() < 1e-9);
        assert!((metric.water_level - 0.4).abs() < 1e-9);
    }

    #[test]
    fn test_unavailable_during_warm_up() {
        let engine = AggregationEngine::new(10.5);
        let mut buffer = HistoryBuffer::new(5);

        for i in 0..4 {
            buffer.push(Reading::new(10.0 + i as f64, Utc::now()));
            assert_eq!(engine.compute(&buffer), None);
        }
    }

    #[test]
    fn test_average_uses_only_window_readings() {
        let engine = AggregationEngine::new(20.0);
        let mut buffer = HistoryBuffer::new(2);
        buffer.push(Reading::new(100.0, Utc::now()));
        buffer.push(Reading::new(4.0, Utc::now()));
        buffer.push(Reading::new(6.0, Utc::now()));

        let metric = engine.compute(&buffer).unwrap();
        assert_eq!(metric.avg_distance, 5.0);
        assert_eq!(metric.water_level, 15.0);
    }

    #[test]
    fn test_report_line_contents() {
        let buffer = filled_buffer(&[10.0, 10.2, 10.1, 9.9, 10.3]);
        let engine = AggregationEngine::new(10.5);
        let metric = engine.compute(&buffer).unwrap();

        let line = engine.report(&buffer, &metric, None);
        assert!(line.contains("2024-05-01 08:04:00 UTC"));
        assert!(line.contains("Q1: 10.30 Q2: 9.90 Q3: 10.10 Q4: 10.20 Q5: 10.00"));
        assert!(line.contains("Avg Dist: 10.10CM"));
        assert!(line.contains("WaterLevel: 0.40CM"));
        assert!(line.ends_with("LastAlert: never"));

        let alerted = Utc.with_ymd_and_hms(2024, 5, 1, 7, 30, 15).unwrap();
        let line = engine.report(&buffer, &metric, Some(alerted));
        assert!(line.ends_with("LastAlert: 07:30:15 UTC"));
    }
}
