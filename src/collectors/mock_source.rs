use crate::collectors::SampleSource;
use crate::error::SampleError;
use crate::events::Reading;
use chrono::Utc;
use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

/// Mock sample source for testing and demos
///
/// Replays scripted results in order. Once the script runs out it either
/// keeps returning a fixed distance or fails with a transport error.
#[derive(Debug, Clone)]
pub struct MockSampleSource {
    script: Arc<Mutex<VecDeque<Result<Reading, SampleError>>>>,
    fallback_distance: Option<f64>,
    call_count: Arc<Mutex<usize>>,
}

impl MockSampleSource {
    /// Create a source that returns `results` in order, then fails
    pub fn with_results(results: Vec<Result<Reading, SampleError>>) -> Self {
        Self {
            script: Arc::new(Mutex::new(results.into())),
            fallback_distance: None,
            call_count: Arc::new(Mutex::new(0)),
        }
    }

    /// Create a source that returns the given distances, stamped at fetch time
    pub fn with_distances(distances: &[f64]) -> Self {
        let now = Utc::now();
        Self::with_results(
            distances
                .iter()
                .map(|d| Ok(Reading::new(*d, now)))
                .collect(),
        )
    }

    /// Create a source that always returns `distance`
    pub fn constant(distance: f64) -> Self {
        Self {
            fallback_distance: Some(distance),
            ..Self::with_results(Vec::new())
        }
    }

    /// Get the number of times fetch() has been called
    pub fn call_count(&self) -> usize {
        self.call_count.lock().map(|count| *count).unwrap_or(0)
    }
}

impl SampleSource for MockSampleSource {
    fn fetch(&self) -> Pin<Box<dyn Future<Output = Result<Reading, SampleError>> + Send + '_>> {
        Box::pin(async move {
            if let Ok(mut count) = self.call_count.lock() {
                *count += 1;
            }

            let scripted = self
                .script
                .lock()
                .ok()
                .and_then(|mut script| script.pop_front());

            match (scripted, self.fallback_distance) {
                (Some(result), _) => result,
                (None, Some(distance)) => Ok(Reading::new(distance, Utc::now())),
                (None, None) => Err(SampleError::Transport(
                    "mock sample source exhausted".to_string(),
                )),
            }
        })
    }
}
