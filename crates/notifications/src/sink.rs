//! Delivery sink contract.

use thiserror::Error;
use tracing::info;

/// One rendered notification, addressed and ready to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub to: String,
    pub subject: String,
    pub body: String,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("delivery failed: {0}")]
pub struct DeliveryError(pub String);

/// Fire-and-forget "send this to that address" collaborator.
///
/// One failed delivery must never block the others; callers own the
/// catch-and-tally logic.
pub trait DeliverySink: Send + Sync {
    fn deliver(&self, notification: &Notification) -> Result<(), DeliveryError>;
}

/// Sink that logs the rendered notification instead of sending it.
///
/// The default wiring until real SMTP credentials are configured.
#[derive(Debug, Default)]
pub struct LoggingSink;

impl DeliverySink for LoggingSink {
    fn deliver(&self, notification: &Notification) -> Result<(), DeliveryError> {
        info!(
            to = %notification.to,
            subject = %notification.subject,
            "email would be sent:\n{}",
            notification.body
        );
        Ok(())
    }
}
