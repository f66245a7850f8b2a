use crate::alerts::AlertMessage;
use crate::error::AlertError;
use crate::notifiers::Notifier;
use log::info;
use std::future::Future;
use std::pin::Pin;

/// Notifier that writes alerts to the log instead of delivering them
///
/// Used for `--dry-run` and whenever no webhook is configured.
#[derive(Debug, Default, Clone)]
pub struct LogNotifier;

impl LogNotifier {
    pub fn new() -> Self {
        Self
    }
}

impl Notifier for LogNotifier {
    fn send<'a>(
        &'a self,
        message: &'a AlertMessage,
    ) -> Pin<Box<dyn Future<Output = Result<(), AlertError>> + Send + 'a>> {
        Box::pin(async move {
            info!("ALERT (log only): {}", message.to_text().replace('\n', " | "));
            Ok(())
        })
    }

    fn name(&self) -> &str {
        "log"
    }
}
