//! The poll loop
//!
//! [`BowlMonitor`] owns the history and the alert state and is the only thing
//! that mutates them. A cycle runs to completion before the next one starts:
//!
//! ```text
//! fetch ──► push ──► compute ──► evaluate ──► (Raise) spawn delivery
//!   │
//!   └─ error: log, count, skip the cycle
//! ```
//!
//! Deliveries run on their own tasks and are never awaited by the cycle.

use crate::aggregator::{AggregatedMetric, AggregationEngine, HistoryBuffer};
use crate::alerts::{AlertDecisionEngine, AlertMessage, Decision};
use crate::collectors::SampleSource;
use crate::config::Config;
use crate::error::SampleError;
use crate::events::Timestamp;
use crate::monitoring::SelfMonitoringCollector;
use crate::notifiers::Notifier;
use chrono::Utc;
use log::{debug, error, info, warn};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// How many cycles pass between two self-monitoring summaries
const STATS_EVERY_CYCLES: u64 = 60;

/// How a single cycle ended
#[derive(Debug, Clone, PartialEq)]
pub enum CycleOutcome {
    /// The reading could not be obtained; nothing was mutated
    Skipped(SampleError),
    /// The reading was stored but the window is not full yet
    WarmingUp { readings: usize, capacity: usize },
    /// A metric was computed and no alert is due
    Suppressed(AggregatedMetric),
    /// An alert was raised and its delivery dispatched
    Raised(AlertMessage),
}

/// Single-actor monitor for one water bowl
pub struct BowlMonitor {
    source: Box<dyn SampleSource>,
    notifier: Arc<dyn Notifier>,
    history: HistoryBuffer,
    engine: AggregationEngine,
    decision: AlertDecisionEngine,
    monitoring: SelfMonitoringCollector,
    poll_interval: Duration,
    /// Deliveries that may still be in flight
    deliveries: Vec<JoinHandle<()>>,
}

impl BowlMonitor {
    /// Create a monitor with empty history that has never alerted
    pub fn new(config: &Config, source: Box<dyn SampleSource>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            source,
            notifier,
            history: HistoryBuffer::new(config.window.size),
            engine: AggregationEngine::new(config.bowl.max_depth_cm),
            decision: AlertDecisionEngine::new(config.alert_band(), config.cooldown()),
            monitoring: SelfMonitoringCollector::new(),
            poll_interval: config.poll_interval(),
            deliveries: Vec::new(),
        }
    }

    /// Override the time slept between cycles
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Run one cycle using the current wall clock
    pub async fn run_cycle(&mut self) -> CycleOutcome {
        self.run_cycle_at(Utc::now()).await
    }

    /// Run one cycle, evaluating the cooldown against `now`
    pub async fn run_cycle_at(&mut self, now: Timestamp) -> CycleOutcome {
        let reading = match self.source.fetch().await {
            Ok(reading) => reading,
            Err(e) => {
                match &e {
                    SampleError::Transport(_) => {
                        warn!("Skipping cycle: {}", e);
                        self.monitoring.record_transport_failure();
                    }
                    SampleError::Format(_) => {
                        error!("Skipping cycle: {}", e);
                        self.monitoring.record_format_failure();
                    }
                }
                return CycleOutcome::Skipped(e);
            }
        };

        self.monitoring.record_completed_cycle(reading.timestamp);
        self.history.push(reading);

        let metric = self.engine.compute(&self.history);
        if let Some(ref metric) = metric {
            info!(
                "{}",
                self.engine
                    .report(&self.history, metric, self.decision.last_alert_at())
            );
        }

        let decision = self.decision.evaluate(metric.as_ref(), now);
        match (decision, metric) {
            (Decision::Raise, Some(metric)) => {
                info!(
                    "Low water: average distance {:.2}cm, water level {:.2}cm; raising alert",
                    metric.avg_distance, metric.water_level
                );
                let message = AlertMessage::new(&metric, now);
                self.monitoring.record_alert_raised();
                self.dispatch(message.clone());
                CycleOutcome::Raised(message)
            }
            (_, Some(metric)) => CycleOutcome::Suppressed(metric),
            (_, None) => {
                debug!(
                    "Warming up: {}/{} readings",
                    self.history.len(),
                    self.history.capacity()
                );
                CycleOutcome::WarmingUp {
                    readings: self.history.len(),
                    capacity: self.history.capacity(),
                }
            }
        }
    }

    /// Hand the message to the notifier on a separate task
    fn dispatch(&mut self, message: AlertMessage) {
        let notifier = Arc::clone(&self.notifier);
        let monitoring = self.monitoring.clone();

        let handle = tokio::spawn(async move {
            match notifier.send(&message).await {
                Ok(()) => {
                    info!("Alert delivered via {}", notifier.name());
                    monitoring.record_notification_result(true);
                }
                Err(e) => {
                    error!("Failed to deliver alert via {}: {}", notifier.name(), e);
                    monitoring.record_notification_result(false);
                }
            }
        });

        self.deliveries.retain(|h| !h.is_finished());
        self.deliveries.push(handle);
    }

    /// Wait for every dispatched delivery to finish
    pub async fn flush_deliveries(&mut self) {
        for handle in self.deliveries.drain(..) {
            if let Err(e) = handle.await {
                error!("Delivery task failed: {}", e);
            }
        }
    }

    /// Run cycles until `shutdown` flips to true or its sender is dropped
    ///
    /// Sleeps for the poll interval after each cycle. Outstanding deliveries
    /// are drained before returning.
    pub async fn run(&mut self, mut shutdown: watch::Receiver<bool>) {
        let band = self.decision.band();
        info!(
            "Polling every {}s, averaging {} readings; bowl depth {:.2}cm, alert band ({:.2}, {:.2})cm, cooldown {}s",
            self.poll_interval.as_secs_f64(),
            self.history.capacity(),
            self.engine.max_depth(),
            band.min_distance,
            band.max_distance,
            self.decision.cooldown().num_seconds()
        );

        let mut cycles: u64 = 0;
        while !*shutdown.borrow() {
            self.run_cycle().await;

            cycles += 1;
            if cycles % STATS_EVERY_CYCLES == 0 {
                self.monitoring.collect_metrics();
            }

            tokio::select! {
                _ = tokio::time::sleep(self.poll_interval) => {}
                _ = shutdown.changed() => break,
            }
        }

        info!("Poll loop stopped after {} cycles", cycles);
        self.flush_deliveries().await;
        self.monitoring.collect_metrics();
    }

    pub fn history(&self) -> &HistoryBuffer {
        &self.history
    }

    pub fn aggregation_engine(&self) -> &AggregationEngine {
        &self.engine
    }

    pub fn decision_engine(&self) -> &AlertDecisionEngine {
        &self.decision
    }

    pub fn monitoring(&self) -> &SelfMonitoringCollector {
        &self.monitoring
    }

    pub fn pending_deliveries(&self) -> usize {
        self.deliveries.iter().filter(|h| !h.is_finished()).count()
    }
}
