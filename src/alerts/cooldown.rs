use crate::events::Timestamp;
use chrono::Duration;

/// Minimum spacing between two raised alerts
///
/// Holds the time of the last alert. A new alert is allowed only once strictly
/// more than `interval` has elapsed since then. There is no timer; the check
/// is made against the caller's clock on every call.
#[derive(Debug, Clone)]
pub struct Cooldown {
    /// Required quiet time between alerts
    interval: Duration,
    /// When the last alert was raised, `None` if never
    last_fired_at: Option<Timestamp>,
}

impl Default for Cooldown {
    fn default() -> Self {
        Self::new(Duration::hours(1))
    }
}

impl Cooldown {
    /// Create a cooldown that has never fired
    ///
    /// # Arguments
    ///
    /// * `interval` - Minimum elapsed time between two alerts
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_fired_at: None,
        }
    }

    /// Whether an alert may fire at `now`
    pub fn is_ready_at(&self, now: Timestamp) -> bool {
        match self.last_fired_at {
            None => true,
            Some(last) => now - last > self.interval,
        }
    }

    /// Record that an alert fired at `now`
    pub fn record_at(&mut self, now: Timestamp) {
        self.last_fired_at = Some(now);
    }

    /// Time left before the cooldown elapses, `None` when ready
    pub fn remaining_at(&self, now: Timestamp) -> Option<Duration> {
        if self.is_ready_at(now) {
            return None;
        }
        self.last_fired_at
            .map(|last| self.interval - (now - last).max(Duration::zero()))
    }

    pub fn last_fired_at(&self) -> Option<Timestamp> {
        self.last_fired_at
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn t0() -> Timestamp {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_never_fired_is_ready() {
        let cooldown = Cooldown::new(Duration::seconds(3600));
        assert!(cooldown.is_ready_at(t0()));
        assert_eq!(cooldown.last_fired_at(), None);
        assert_eq!(cooldown.remaining_at(t0()), None);
    }

    #[test]
    fn test_blocks_within_interval() {
        let mut cooldown = Cooldown::new(Duration::seconds(3600));
        cooldown.record_at(t0());

        assert!(!cooldown.is_ready_at(t0()));
        assert!(!cooldown.is_ready_at(t0() + Duration::seconds(3599)));
        assert_eq!(
            cooldown.remaining_at(t0() + Duration::seconds(3000)),
            Some(Duration::seconds(600))
        );
    }

    #[test]
    fn test_boundary_is_exclusive() {
        let mut cooldown = Cooldown::new(Duration::seconds(3600));
        cooldown.record_at(t0());

        // Exactly one interval later is not enough
        assert!(!cooldown.is_ready_at(t0() + Duration::seconds(3600)));
        assert!(cooldown.is_ready_at(t0() + Duration::seconds(3601)));
    }

    #[test]
    fn test_clock_going_backwards_stays_blocked() {
        let mut cooldown = Cooldown::new(Duration::seconds(60));
        cooldown.record_at(t0());
        assert!(!cooldown.is_ready_at(t0() - Duration::seconds(120)));
        assert_eq!(
            cooldown.remaining_at(t0() - Duration::seconds(120)),
            Some(Duration::seconds(60))
        );
    }

    #[test]
    fn test_maximal_interval_never_overflows() {
        let mut cooldown = Cooldown::new(Duration::MAX);
        assert_eq!(cooldown.interval(), Duration::MAX);
        cooldown.record_at(t0());

        assert_eq!(
            cooldown.remaining_at(t0() - Duration::days(1)),
            Some(Duration::MAX)
        );
        assert!(cooldown.remaining_at(t0() + Duration::days(1)).is_some());
    }
}
