//! Transit envelope for published events.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Envelope for one published event: identity, routing, and the raw payload.
///
/// The payload stays as JSON until a consumer decodes it, so an envelope can
/// cross the broker without the consumer knowing every producer-side type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventEnvelope {
    event_id: Uuid,
    routing_key: String,
    published_at: DateTime<Utc>,
    payload: serde_json::Value,
}

impl EventEnvelope {
    pub fn new(routing_key: impl Into<String>, payload: serde_json::Value) -> Self {
        Self {
            event_id: Uuid::now_v7(),
            routing_key: routing_key.into(),
            published_at: Utc::now(),
            payload,
        }
    }

    pub fn event_id(&self) -> Uuid {
        self.event_id
    }

    pub fn routing_key(&self) -> &str {
        &self.routing_key
    }

    pub fn published_at(&self) -> DateTime<Utc> {
        self.published_at
    }

    pub fn payload(&self) -> &serde_json::Value {
        &self.payload
    }

    /// Decode the payload into a consumer-side type.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_value(self.payload.clone())
    }
}
