use crate::alerts::AlertMessage;
use crate::error::AlertError;
use crate::notifiers::Notifier;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Mock notifier for testing
///
/// Records every message it receives and answers with a configurable result.
/// Clones share the same recorded state.
#[derive(Debug, Clone)]
pub struct MockNotifier {
    result: Result<(), AlertError>,
    delay: Option<Duration>,
    sent: Arc<Mutex<Vec<AlertMessage>>>,
}

impl Default for MockNotifier {
    fn default() -> Self {
        Self::success()
    }
}

impl MockNotifier {
    /// Create a mock notifier whose deliveries always succeed
    pub fn success() -> Self {
        Self {
            result: Ok(()),
            delay: None,
            sent: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Create a mock notifier whose deliveries always fail
    pub fn failing(error_message: &str) -> Self {
        Self {
            result: Err(AlertError::DeliveryFailed(error_message.to_string())),
            ..Self::success()
        }
    }

    /// Add a delay before every delivery completes
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Messages passed to `send` so far, in order
    pub fn sent_messages(&self) -> Vec<AlertMessage> {
        self.sent.lock().map(|sent| sent.clone()).unwrap_or_default()
    }

    pub fn call_count(&self) -> usize {
        self.sent.lock().map(|sent| sent.len()).unwrap_or(0)
    }
}

impl Notifier for MockNotifier {
    fn send<'a>(
        &'a self,
        message: &'a AlertMessage,
    ) -> Pin<Box<dyn Future<Output = Result<(), AlertError>> + Send + 'a>> {
        Box::pin(async move {
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }

            if let Ok(mut sent) = self.sent.lock() {
                sent.push(message.clone());
            }

            self.result.clone()
        })
    }

    fn name(&self) -> &str {
        "mock"
    }
}
