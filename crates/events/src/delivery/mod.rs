//! External delivery channels for alert notifications.
//!
//! The ingestion pipeline only sees the [`Notifier`] seam. Delivery is
//! best-effort: implementations log their own failures and report a plain
//! success flag.

pub mod sms;

use async_trait::async_trait;

pub use sms::{SmsConfig, SmsDelivery, SmsError};

/// Best-effort sink for alert messages.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver `message`; `true` when the channel accepted it. Never errors.
    async fn notify(&self, message: &str) -> bool;

    /// Short channel name for logs.
    fn channel(&self) -> &'static str;
}

/// Fallback notifier used when no external channel is configured.
///
/// Logs the message it would have sent and reports failure.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, message: &str) -> bool {
        tracing::info!(message, "SMS not configured, alert not delivered");
        false
    }

    fn channel(&self) -> &'static str {
        "log"
    }
}
