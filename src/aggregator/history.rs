//! Fixed-capacity reading history
//!
//! Stores the most recent readings, newest first. Once the buffer holds
//! `capacity` readings every push evicts the oldest one.

use crate::events::Reading;
use std::collections::VecDeque;

/// Bounded, insertion-ordered store of the most recent readings
#[derive(Debug, Clone)]
pub struct HistoryBuffer {
    /// Readings ordered most-recent-first
    readings: VecDeque<Reading>,
    /// Maximum number of readings kept
    capacity: usize,
}

impl Default for HistoryBuffer {
    fn default() -> Self {
        Self::new(5)
    }
}

impl HistoryBuffer {
    /// Create an empty buffer holding at most `capacity` readings
    ///
    /// A capacity of zero is treated as one, since an empty window has no
    /// average.
    ///
    /// # Examples
    ///
    /// ```
    /// use bowlwatch::aggregator::HistoryBuffer;
    ///
    /// let buffer = HistoryBuffer::new(5);
    /// assert!(buffer.is_empty());
    /// assert!(!buffer.is_full());
    /// ```
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            readings: VecDeque::new(),
            capacity,
        }
    }

    /// Insert a reading at the front, evicting the oldest one past capacity
    pub fn push(&mut self, reading: Reading) {
        self.readings.push_front(reading);
        self.readings.truncate(self.capacity);
    }

    /// Whether the buffer has reached its capacity
    ///
    /// Readings are never removed except by eviction, so once full the
    /// buffer stays full.
    pub fn is_full(&self) -> bool {
        self.readings.len() == self.capacity
    }

    /// Copy of the current contents, most-recent-first
    pub fn snapshot(&self) -> Vec<Reading> {
        self.readings.iter().cloned().collect()
    }

    /// Iterate over the readings, most-recent-first
    pub fn iter(&self) -> impl Iterator<Item = &Reading> {
        self.readings.iter()
    }

    /// The newest reading, if any
    pub fn latest(&self) -> Option<&Reading> {
        self.readings.front()
    }

    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}


#[cfg(test)]
mod property_tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use quickcheck_macros::quickcheck;

    // Length is bounded and contents are the newest readings in reverse push order
    #[quickcheck]
    fn prop_snapshot_holds_most_recent_readings(capacity: u8, values: Vec<i16>) -> bool {
        let capacity = (capacity % 10) as usize + 1;
        let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let mut buffer = HistoryBuffer::new(capacity);

        let pushed: Vec<Reading> = values
            .iter()
            .enumerate()
            .map(|(i, v)| Reading::new(*v as f64 / 10.0, base + Duration::seconds(i as i64)))
            .collect();

        for r in &pushed {
            buffer.push(r.clone());
            if buffer.len() > capacity {
                return false;
            }
        }

        let expected: Vec<Reading> = pushed.iter().rev().take(capacity).cloned().collect();
        buffer.snapshot() == expected
    }

    #[quickcheck]
    fn prop_full_only_after_capacity_pushes(capacity: u8, pushes: u8) -> bool {
        let capacity = (capacity % 10) as usize + 1;
        let pushes = (pushes % 20) as usize;
        let mut buffer = HistoryBuffer::new(capacity);

        for _ in 0..pushes {
            buffer.push(Reading::new(10.0, Utc::now()));
        }

        buffer.is_full() == (pushes >= capacity)
    }
}
