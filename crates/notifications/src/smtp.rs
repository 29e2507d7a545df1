//! SMTP delivery sink.

use std::time::Duration;

use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};

use crate::sink::{DeliveryError, DeliverySink, Notification};

#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub username: String,
    pub password: String,
    pub from: String,
    /// Transport-level timeout so one slow recipient cannot stall a whole
    /// fan-out loop.
    pub timeout: Duration,
}

/// Real mail delivery over SMTP.
pub struct SmtpSink {
    transport: SmtpTransport,
    from: Mailbox,
}

impl SmtpSink {
    pub fn new(config: SmtpConfig) -> Result<Self, DeliveryError> {
        let from = config
            .from
            .parse::<Mailbox>()
            .map_err(|e| DeliveryError(format!("invalid from address: {e}")))?;

        let transport = SmtpTransport::relay(&config.host)
            .map_err(|e| DeliveryError(format!("smtp relay setup failed: {e}")))?
            .credentials(Credentials::new(config.username, config.password))
            .timeout(Some(config.timeout))
            .build();

        Ok(Self { transport, from })
    }
}

impl DeliverySink for SmtpSink {
    fn deliver(&self, notification: &Notification) -> Result<(), DeliveryError> {
        let to = notification
            .to
            .parse::<Mailbox>()
            .map_err(|e| DeliveryError(format!("invalid recipient address: {e}")))?;

        let message = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(notification.subject.clone())
            .header(ContentType::TEXT_PLAIN)
            .body(notification.body.clone())
            .map_err(|e| DeliveryError(format!("failed to build message: {e}")))?;

        self.transport
            .send(&message)
            .map(|_| ())
            .map_err(|e| DeliveryError(e.to_string()))
    }
}
