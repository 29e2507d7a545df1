//! Best-effort event publisher.
//!
//! The store write that precedes a publish is authoritative; the event path
//! is advisory. A broker failure is therefore recorded as an outcome value
//! and logged, never raised back into the request that triggered it.

use std::sync::Arc;

use uuid::Uuid;

use crate::broker::MessageBroker;
use crate::envelope::EventEnvelope;
use crate::payload::DomainEvent;

/// Result of one publish attempt, observable by the caller but carrying no
/// obligation to act on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishOutcome {
    Published { event_id: Uuid },
    Failed { error: String },
}

impl PublishOutcome {
    pub fn is_published(&self) -> bool {
        matches!(self, PublishOutcome::Published { .. })
    }
}

/// Publishes domain events onto the topic exchange.
#[derive(Clone)]
pub struct EventPublisher {
    broker: Arc<dyn MessageBroker>,
}

impl EventPublisher {
    pub fn new(broker: Arc<dyn MessageBroker>) -> Self {
        Self { broker }
    }

    /// Serialize and publish. Never propagates broker failure.
    pub fn publish(&self, event: &DomainEvent) -> PublishOutcome {
        let routing_key = event.routing_key();

        let payload = match event.payload_json() {
            Ok(payload) => payload,
            Err(e) => {
                tracing::error!(routing_key, error = %e, "failed to serialize event");
                return PublishOutcome::Failed {
                    error: e.to_string(),
                };
            }
        };

        let envelope = EventEnvelope::new(routing_key, payload);
        let event_id = envelope.event_id();

        match self.broker.publish(envelope) {
            Ok(()) => {
                tracing::info!(routing_key, %event_id, "event published");
                PublishOutcome::Published { event_id }
            }
            Err(e) => {
                tracing::warn!(routing_key, %event_id, error = %e, "event publish failed, continuing");
                PublishOutcome::Failed {
                    error: e.to_string(),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::in_memory::InMemoryBroker;
    use crate::payload::{JobPosted, routing_keys};
    use hireboard_core::JobId;

    fn job_posted() -> DomainEvent {
        DomainEvent::JobPosted(JobPosted {
            job_id: JobId::new(),
            title: "Backend Engineer".into(),
            company_name: "Initech".into(),
            location: "Remote".into(),
            category: "SOFTWARE_DEVELOPMENT".into(),
            salary_min: None,
            salary_max: None,
            posted_by_username: "bill".into(),
            posted_by_email: "bill@initech.example".into(),
            recipient_emails: vec![],
        })
    }

    #[test]
    fn published_event_reaches_the_bound_queue() {
        let broker = Arc::new(InMemoryBroker::new());
        let sub = broker.bind(routing_keys::JOB_POSTED);
        let publisher = EventPublisher::new(broker);

        let outcome = publisher.publish(&job_posted());
        assert!(outcome.is_published());

        let delivery = sub.recv_timeout(Duration::from_millis(100)).unwrap();
        let decoded: JobPosted = delivery.envelope.decode().unwrap();
        assert_eq!(decoded.company_name, "Initech");
    }

    #[test]
    fn publish_without_a_binding_still_succeeds() {
        let publisher = EventPublisher::new(Arc::new(InMemoryBroker::new()));
        assert!(publisher.publish(&job_posted()).is_published());
    }
}
