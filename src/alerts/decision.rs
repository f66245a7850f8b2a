//! Debounced alert decision
//!
//! The engine combines two independent guards:
//!
//! - a distance band that rejects both a full bowl (small distance) and a
//!   bowl lifted off its stand (distance far above the operating range), and
//! - a [`Cooldown`] that keeps a persisting condition from re-alerting every
//!   cycle.
//!
//! The cooldown is restarted when the decision is made, not when delivery is
//! confirmed. A failed delivery therefore still silences the next window.

use crate::aggregator::AggregatedMetric;
use crate::alerts::Cooldown;
use crate::events::Timestamp;
use chrono::Duration;
use log::debug;
use serde::{Deserialize, Serialize};

/// Outcome of evaluating one cycle's metric
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    /// Send a notification
    Raise,
    /// Stay silent
    Suppress,
}

/// Logical state of the engine at a point in time
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AlertPhase {
    /// No alert sent within the cooldown window
    Quiet,
    /// An alert was sent within the cooldown window
    Cooling,
}

/// Open interval of average distances that counts as low water
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct AlertBand {
    /// Distances at or below this are a full enough bowl
    pub min_distance: f64,
    /// Distances at or above this mean the bowl is off the stand
    pub max_distance: f64,
}

impl AlertBand {
    pub fn new(min_distance: f64, max_distance: f64) -> Self {
        Self {
            min_distance,
            max_distance,
        }
    }

    /// Whether `avg_distance` lies strictly inside the band
    pub fn contains(&self, avg_distance: f64) -> bool {
        avg_distance > self.min_distance && avg_distance < self.max_distance
    }
}

/// Stateful alert gate holding the time of the last raised alert
#[derive(Debug, Clone)]
pub struct AlertDecisionEngine {
    band: AlertBand,
    cooldown: Cooldown,
}

impl AlertDecisionEngine {
    /// Create an engine that has never raised an alert
    ///
    /// # Arguments
    ///
    /// * `band` - Average distances that indicate low water
    /// * `cooldown` - Minimum elapsed time between two raised alerts
    pub fn new(band: AlertBand, cooldown: Duration) -> Self {
        Self {
            band,
            cooldown: Cooldown::new(cooldown),
        }
    }

    /// Decide whether this cycle raises an alert
    ///
    /// `metric` is `None` during warm-up, which always suppresses. On
    /// [`Decision::Raise`] the last-alert time is set to `now` before
    /// returning.
    pub fn evaluate(&mut self, metric: Option<&AggregatedMetric>, now: Timestamp) -> Decision {
        let Some(metric) = metric else {
            debug!("Suppressing: history window not yet full");
            return Decision::Suppress;
        };

        if !self.band.contains(metric.avg_distance) {
            debug!(
                "Suppressing: average distance {:.2}cm outside alert band ({:.2}, {:.2})",
                metric.avg_distance, self.band.min_distance, self.band.max_distance
            );
            return Decision::Suppress;
        }

        if let Some(remaining) = self.cooldown.remaining_at(now) {
            debug!(
                "Suppressing: cooldown active for another {}s",
                remaining.num_seconds()
            );
            return Decision::Suppress;
        }

        self.cooldown.record_at(now);
        Decision::Raise
    }

    /// Phase of the engine as seen at `now`
    pub fn phase(&self, now: Timestamp) -> AlertPhase {
        if self.cooldown.is_ready_at(now) {
            AlertPhase::Quiet
        } else {
            AlertPhase::Cooling
        }
    }

    pub fn last_alert_at(&self) -> Option<Timestamp> {
        self.cooldown.last_fired_at()
    }

    pub fn band(&self) -> AlertBand {
        self.band
    }

    /// Minimum elapsed time between two raised alerts
    pub fn cooldown(&self) -> Duration {
        self.cooldown.interval()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    const COOLDOWN_SECS: i64 = 3600;

    fn engine() -> AlertDecisionEngine {
        AlertDecisionEngine::new(
            AlertBand::new(10.0, 11.5),
            Duration::seconds(COOLDOWN_SECS),
        )
    }

    fn metric(avg_distance: f64) -> AggregatedMetric {
        AggregatedMetric {
            avg_distance,
            water_level: 10.5 - avg_distance,
        }
    }

    fn t0() -> Timestamp {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_raises_inside_band_without_prior_alert() {
        let mut engine = engine();
        assert_eq!(engine.evaluate(Some(&metric(10.1)), t0()), Decision::Raise);
        assert_eq!(engine.last_alert_at(), Some(t0()));
    }

    #[test]
    fn test_suppresses_when_sensor_removed() {
        let mut engine = engine();
        assert_eq!(engine.evaluate(Some(&metric(15.0)), t0()), Decision::Suppress);
        assert_eq!(engine.last_alert_at(), None);
    }

    #[test]
    fn test_suppresses_when_bowl_full() {
        let mut engine = engine();
        assert_eq!(engine.evaluate(Some(&metric(6.0)), t0()), Decision::Suppress);
    }

    #[test]
    fn test_band_edges_are_exclusive() {
        let mut engine = engine();
        assert_eq!(engine.evaluate(Some(&metric(10.0)), t0()), Decision::Suppress);
        assert_eq!(engine.evaluate(Some(&metric(11.5)), t0()), Decision::Suppress);
    }

    #[test]
    fn test_suppresses_while_warming_up() {
        let mut engine = engine();
        assert_eq!(engine.evaluate(None, t0()), Decision::Suppress);
        assert_eq!(engine.phase(t0()), AlertPhase::Quiet);
    }

    #[test]
    fn test_cooldown_window() {
        let mut engine = engine();
        assert_eq!(engine.evaluate(Some(&metric(10.1)), t0()), Decision::Raise);

        let just_before = t0() + Duration::seconds(COOLDOWN_SECS - 1);
        assert_eq!(
            engine.evaluate(Some(&metric(10.1)), just_before),
            Decision::Suppress
        );
        assert_eq!(engine.phase(just_before), AlertPhase::Cooling);

        let just_after = t0() + Duration::seconds(COOLDOWN_SECS + 1);
        assert_eq!(engine.phase(just_after), AlertPhase::Quiet);
        assert_eq!(
            engine.evaluate(Some(&metric(10.1)), just_after),
            Decision::Raise
        );
        assert_eq!(engine.last_alert_at(), Some(just_after));
    }

    #[test]
    fn test_suppressed_cycles_do_not_extend_cooldown() {
        let mut engine = engine();
        engine.evaluate(Some(&metric(10.1)), t0());

        for minute in 1..60 {
            let now = t0() + Duration::minutes(minute);
            assert_eq!(engine.evaluate(Some(&metric(10.1)), now), Decision::Suppress);
        }
        assert_eq!(engine.last_alert_at(), Some(t0()));
    }

    #[test]
    fn test_out_of_band_metric_does_not_touch_cooldown() {
        let mut engine = engine();
        engine.evaluate(Some(&metric(20.0)), t0());
        assert_eq!(engine.phase(t0()), AlertPhase::Quiet);
        assert_eq!(
            engine.evaluate(Some(&metric(10.1)), t0() + Duration::seconds(1)),
            Decision::Raise
        );
    }

    #[test]
    fn test_settings_accessors() {
        let engine = engine();
        assert_eq!(engine.band(), AlertBand::new(10.0, 11.5));
        assert_eq!(engine.cooldown(), Duration::seconds(COOLDOWN_SECS));
    }

    #[test]
    fn test_decision_serialization() {
        assert_eq!(serde_json::to_string(&Decision::Raise).unwrap(), "\"raise\"");
        assert_eq!(serde_json::to_string(&AlertPhase::Cooling).unwrap(), "\"cooling\"");
    }
}

#[cfg(test)]
mod property_tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use quickcheck_macros::quickcheck;

    // Two raises are always separated by more than the cooldown
    #[quickcheck]
    fn prop_raises_respect_cooldown(cooldown_secs: u16, steps: Vec<u16>) -> bool {
        let cooldown = Duration::seconds(cooldown_secs as i64);
        let mut engine = AlertDecisionEngine::new(AlertBand::new(10.0, 11.5), cooldown);
        let metric = AggregatedMetric {
            avg_distance: 10.1,
            water_level: 0.4,
        };

        let mut now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let mut last_raise: Option<Timestamp> = None;

        for step in steps {
            now += Duration::seconds(step as i64);
            if engine.evaluate(Some(&metric), now) == Decision::Raise {
                if let Some(prev) = last_raise {
                    if now - prev <= cooldown {
                        return false;
                    }
                }
                last_raise = Some(now);
            }
        }
        true
    }

    // Metrics outside the band never raise, whatever the timing
    #[quickcheck]
    fn prop_out_of_band_never_raises(distance: i16, offset_secs: u32) -> bool {
        let avg_distance = distance as f64 / 10.0;
        let band = AlertBand::new(10.0, 11.5);
        if band.contains(avg_distance) {
            return true;
        }

        let mut engine = AlertDecisionEngine::new(band, Duration::seconds(60));
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
            + Duration::seconds(offset_secs as i64);
        let metric = AggregatedMetric {
            avg_distance,
            water_level: 10.5 - avg_distance,
        };
        engine.evaluate(Some(&metric), now) == Decision::Suppress
    }
}
