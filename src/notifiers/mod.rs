//! Alert delivery channels
//!
//! Every channel implements [`Notifier`]. The monitor holds a notifier behind
//! an `Arc` and drives each delivery on its own task, so implementations must
//! be `Send + Sync`.

pub mod console;
pub mod mock;
pub mod slack;

pub use console::LogNotifier;
pub use mock::MockNotifier;
pub use slack::SlackNotifier;

use crate::alerts::AlertMessage;
use crate::error::AlertError;
use std::future::Future;
use std::pin::Pin;

/// Trait for alert delivery implementations
pub trait Notifier: Send + Sync {
    fn send<'a>(
        &'a self,
        message: &'a AlertMessage,
    ) -> Pin<Box<dyn Future<Output = Result<(), AlertError>> + Send + 'a>>;

    /// Short name used in log lines
    fn name(&self) -> &str;
}
