//! `hireboard-notifications` — event-driven notification fan-out.
//!
//! Consumes the three job-board topics and turns events into deliveries
//! through an injected [`DeliverySink`]. A pure side effect of the event
//! stream: nothing here ever writes back to the job store, so a delivery
//! failure can never roll back a business transaction.

pub mod consumer;
pub mod messages;
pub mod sink;
pub mod smtp;

pub use consumer::{ConsumerConfig, FanOutSummary, NotificationWorker, WorkerHandle, WorkerStats};
pub use sink::{DeliveryError, DeliverySink, LoggingSink, Notification};
pub use smtp::{SmtpConfig, SmtpSink};
