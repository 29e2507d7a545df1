//! Message broker abstraction (mechanics only).
//!
//! A topic-routed broker: producers publish an envelope under a routing key,
//! each key binds one queue, and every message on a queue is handed to
//! exactly one of its subscribers (competing consumers). Delivery is
//! at-least-once; a message handed back via `requeue` will be redelivered
//! with an incremented attempt counter.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::envelope::EventEnvelope;
use crate::in_memory::QueueSubscription;

/// Broker-side failure. Publishing is best-effort for callers; the publisher
/// converts this into a logged outcome rather than propagating it.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("broker error: {0}")]
pub struct BrokerError(pub String);

/// One delivery of a message to one consumer.
///
/// `attempt` is 1-based: the first delivery of a message is attempt 1, and a
/// requeue bumps it. Consumers use it to drive their retry policy.
#[derive(Debug, Clone, PartialEq)]
pub struct Delivery {
    pub envelope: EventEnvelope,
    pub attempt: u32,
}

/// A message parked after its retries were exhausted (or it was poison).
#[derive(Debug, Clone, PartialEq)]
pub struct DeadLetter {
    pub envelope: EventEnvelope,
    pub attempts: u32,
    pub reason: String,
    pub dead_lettered_at: DateTime<Utc>,
}

/// Topic-routed broker contract.
///
/// Implementations must be safe to share across threads; publishing never
/// blocks on consumers.
pub trait MessageBroker: Send + Sync {
    /// Route an envelope to the queue bound to its routing key. An envelope
    /// whose key has no bound queue is dropped, as a topic exchange would.
    fn publish(&self, envelope: EventEnvelope) -> Result<(), BrokerError>;

    /// Bind (or join) the queue for a routing key. Subscriptions to the same
    /// key compete for messages; each message goes to one of them.
    fn bind(&self, routing_key: &str) -> QueueSubscription;
}
