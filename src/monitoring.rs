//! Self-monitoring counters for the poll loop
//!
//! Tracks how cycles end and how alert deliveries fare, so that a sensor that
//! keeps dropping off the network or a webhook that keeps rejecting posts
//! shows up in the log instead of failing silently.

use crate::events::Timestamp;
use chrono::Utc;
use log::{debug, info, warn};
use std::sync::{Arc, Mutex};

/// Point-in-time copy of the counters
#[derive(Debug, Clone, PartialEq)]
pub struct CycleMetrics {
    /// Cycles that completed a fetch and evaluation
    pub completed_cycles: u64,
    /// Cycles aborted because the sensor could not be reached
    pub transport_failures: u64,
    /// Cycles aborted because the payload was malformed
    pub format_failures: u64,
    /// Alerts raised by the decision engine
    pub alerts_raised: u64,
    /// Alert deliveries confirmed by the notifier
    pub successful_notifications: u64,
    /// Alert deliveries that failed
    pub failed_notifications: u64,
    /// Notification success rate as a percentage (0-100)
    pub notification_success_rate: f64,
    /// When the last reading was successfully fetched
    pub last_reading_at: Option<Timestamp>,
    /// Timestamp when these metrics were collected
    pub timestamp: Timestamp,
}

#[derive(Debug, Default)]
struct Counters {
    completed_cycles: u64,
    transport_failures: u64,
    format_failures: u64,
    alerts_raised: u64,
    successful_notifications: u64,
    failed_notifications: u64,
    last_reading_at: Option<Timestamp>,
}

/// Shared counter set; clones update the same counters
#[derive(Debug, Clone, Default)]
pub struct SelfMonitoringCollector {
    counters: Arc<Mutex<Counters>>,
}

impl SelfMonitoringCollector {
    pub fn new() -> Self {
        Self::default()
    }

    fn update(&self, f: impl FnOnce(&mut Counters)) {
        if let Ok(mut counters) = self.counters.lock() {
            f(&mut counters);
        }
    }

    /// Record a cycle that fetched a reading taken at `reading_at`
    pub fn record_completed_cycle(&self, reading_at: Timestamp) {
        self.update(|c| {
            c.completed_cycles += 1;
            c.last_reading_at = Some(reading_at);
        });
    }

    pub fn record_transport_failure(&self) {
        self.update(|c| c.transport_failures += 1);
    }

    pub fn record_format_failure(&self) {
        self.update(|c| c.format_failures += 1);
    }

    pub fn record_alert_raised(&self) {
        self.update(|c| c.alerts_raised += 1);
    }

    /// Record the result of a notification delivery attempt
    pub fn record_notification_result(&self, success: bool) {
        debug!("Recording notification result: success={}", success);
        self.update(|c| {
            if success {
                c.successful_notifications += 1;
            } else {
                c.failed_notifications += 1;
            }
        });
    }

    /// Copy the counters without logging
    pub fn snapshot(&self) -> CycleMetrics {
        let counters = match self.counters.lock() {
            Ok(counters) => counters,
            Err(poisoned) => poisoned.into_inner(),
        };

        let deliveries = counters.successful_notifications + counters.failed_notifications;
        let notification_success_rate = if deliveries == 0 {
            100.0
        } else {
            counters.successful_notifications as f64 / deliveries as f64 * 100.0
        };

        CycleMetrics {
            completed_cycles: counters.completed_cycles,
            transport_failures: counters.transport_failures,
            format_failures: counters.format_failures,
            alerts_raised: counters.alerts_raised,
            successful_notifications: counters.successful_notifications,
            failed_notifications: counters.failed_notifications,
            notification_success_rate,
            last_reading_at: counters.last_reading_at,
            timestamp: Utc::now(),
        }
    }

    /// Collect the counters and log a summary, warning on poor health
    pub fn collect_metrics(&self) -> CycleMetrics {
        let metrics = self.snapshot();

        info!(
            "Self-monitoring: cycles={}, transport_failures={}, format_failures={}, alerts={}, notification_success={:.1}%",
            metrics.completed_cycles,
            metrics.transport_failures,
            metrics.format_failures,
            metrics.alerts_raised,
            metrics.notification_success_rate
        );

        let failures = metrics.transport_failures + metrics.format_failures;
        if failures > metrics.completed_cycles {
            warn!(
                "More failed cycles ({}) than completed ones ({}); check the sensor",
                failures, metrics.completed_cycles
            );
        }

        if metrics.failed_notifications > 0 && metrics.notification_success_rate < 90.0 {
            warn!(
                "Low notification success rate: {:.1}%",
                metrics.notification_success_rate
            );
        }

        metrics
    }
}
