//! In-memory topic broker.
//!
//! - No IO / no async; consumers block on a condvar.
//! - Competing consumers: a popped message is gone, so each delivery reaches
//!   exactly one subscriber of the queue.
//! - Requeued messages carry a not-before timestamp so backoff delays are
//!   honored without a timer thread.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Condvar, Mutex, RwLock};
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::broker::{BrokerError, DeadLetter, Delivery, MessageBroker};
use crate::envelope::EventEnvelope;

#[derive(Debug)]
struct QueuedMessage {
    envelope: EventEnvelope,
    attempt: u32,
    available_at: Option<DateTime<Utc>>,
}

impl QueuedMessage {
    fn is_ready(&self, now: DateTime<Utc>) -> bool {
        match self.available_at {
            Some(at) => now >= at,
            None => true,
        }
    }
}

#[derive(Debug, Default)]
struct QueueState {
    ready: VecDeque<QueuedMessage>,
    dead: Vec<DeadLetter>,
}

/// One queue, bound to one routing key.
#[derive(Debug)]
struct TopicQueue {
    state: Mutex<QueueState>,
    cond: Condvar,
}

impl TopicQueue {
    fn new() -> Self {
        Self {
            state: Mutex::new(QueueState::default()),
            cond: Condvar::new(),
        }
    }

    fn push(&self, message: QueuedMessage) {
        let mut state = self.state.lock().unwrap_or_else(|p| p.into_inner());
        state.ready.push_back(message);
        self.cond.notify_one();
    }
}

/// Competing-consumer handle on one queue.
///
/// Popping a delivery acknowledges it implicitly; a consumer that wants the
/// message retried must hand it back via [`QueueSubscription::requeue`].
#[derive(Clone)]
pub struct QueueSubscription {
    queue: Arc<TopicQueue>,
}

impl QueueSubscription {
    /// Block up to `timeout` for the next ready delivery.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<Delivery> {
        let deadline = std::time::Instant::now() + timeout;
        let mut state = self.queue.state.lock().unwrap_or_else(|p| p.into_inner());

        loop {
            let now = Utc::now();
            if let Some(idx) = state.ready.iter().position(|m| m.is_ready(now)) {
                let message = state.ready.remove(idx).expect("index from position");
                return Some(Delivery {
                    envelope: message.envelope,
                    attempt: message.attempt,
                });
            }

            let remaining = deadline.saturating_duration_since(std::time::Instant::now());
            if remaining.is_zero() {
                return None;
            }

            // If everything queued is still backing off, only sleep until the
            // earliest message becomes ready.
            let until_ready = state
                .ready
                .iter()
                .filter_map(|m| m.available_at)
                .min()
                .and_then(|at| (at - now).to_std().ok());
            let wait = match until_ready {
                Some(d) => remaining.min(d.max(Duration::from_millis(1))),
                None => remaining,
            };

            let (guard, _timed_out) = self
                .queue
                .cond
                .wait_timeout(state, wait)
                .unwrap_or_else(|p| p.into_inner());
            state = guard;
        }
    }

    /// Hand a delivery back for redelivery after `delay`, bumping the
    /// attempt counter.
    pub fn requeue(&self, delivery: Delivery, delay: Duration) {
        let available_at = Utc::now() + chrono::Duration::from_std(delay).unwrap_or_default();
        self.queue.push(QueuedMessage {
            envelope: delivery.envelope,
            attempt: delivery.attempt + 1,
            available_at: Some(available_at),
        });
    }

    /// Park a delivery permanently.
    pub fn dead_letter(&self, delivery: Delivery, reason: impl Into<String>) {
        let mut state = self.queue.state.lock().unwrap_or_else(|p| p.into_inner());
        state.dead.push(DeadLetter {
            envelope: delivery.envelope,
            attempts: delivery.attempt,
            reason: reason.into(),
            dead_lettered_at: Utc::now(),
        });
    }

    /// Snapshot of this queue's dead letters.
    pub fn dead_letters(&self) -> Vec<DeadLetter> {
        let state = self.queue.state.lock().unwrap_or_else(|p| p.into_inner());
        state.dead.clone()
    }

    /// Messages currently queued (ready or backing off).
    pub fn depth(&self) -> usize {
        let state = self.queue.state.lock().unwrap_or_else(|p| p.into_inner());
        state.ready.len()
    }
}

/// In-memory topic exchange: routing key -> queue.
#[derive(Default)]
pub struct InMemoryBroker {
    queues: RwLock<HashMap<String, Arc<TopicQueue>>>,
}

impl InMemoryBroker {
    pub fn new() -> Self {
        Self::default()
    }
}

impl MessageBroker for InMemoryBroker {
    fn publish(&self, envelope: EventEnvelope) -> Result<(), BrokerError> {
        let queues = self
            .queues
            .read()
            .map_err(|_| BrokerError("broker lock poisoned".into()))?;

        match queues.get(envelope.routing_key()) {
            Some(queue) => {
                queue.push(QueuedMessage {
                    envelope,
                    attempt: 1,
                    available_at: None,
                });
                Ok(())
            }
            None => {
                // No binding: the exchange drops the message.
                tracing::debug!(
                    routing_key = envelope.routing_key(),
                    "no queue bound for routing key, dropping"
                );
                Ok(())
            }
        }
    }

    fn bind(&self, routing_key: &str) -> QueueSubscription {
        let mut queues = self.queues.write().unwrap_or_else(|p| p.into_inner());
        let queue = queues
            .entry(routing_key.to_string())
            .or_insert_with(|| Arc::new(TopicQueue::new()))
            .clone();
        QueueSubscription { queue }
    }
}
