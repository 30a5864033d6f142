// Event envelope and the closed registry of event types.
//
// Purpose
// - Define the canonical shape of an event record: identity, timestamp, type tag, typed payload.
// - Bind each payload shape to exactly one type tag at compile time.
//
// Versioning and evolution
// - Adding a new event kind means adding an `EventType` variant and a payload type
//   implementing `EventPayload`. This is a schema-level change, not a runtime one.
// - Prefer additive payload changes; unknown fields are ignored on the wire.

use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod user;

/// Closed set of event type tags carried on the wire in the `type` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventType {
    #[serde(rename = "user.created")]
    UserCreated,
    #[serde(rename = "user.updated")]
    UserUpdated,
    #[serde(rename = "user.deleted")]
    UserDeleted,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::UserCreated => "user.created",
            EventType::UserUpdated => "user.updated",
            EventType::UserDeleted => "user.deleted",
        }
    }
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Compile-time registry entry: a payload shape and the single tag it belongs to.
pub trait EventPayload:
    Serialize + DeserializeOwned + Clone + PartialEq + Send + Sync + 'static
{
    const EVENT_TYPE: EventType;
}

/// The outer record wrapping a typed payload with id, timestamp and type metadata.
///
/// Invariant: `event_type` always matches the runtime payload type. Envelopes built
/// through [`EventEnvelope::new`] hold it by construction; the serializer rejects
/// anything that violates it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventEnvelope<P> {
    pub id: Uuid,
    pub timestamp: i64,
    #[serde(rename = "type")]
    pub event_type: EventType,
    pub payload: P,
}

impl<P: EventPayload> EventEnvelope<P> {
    /// Wrap a payload in a fresh envelope with a new id and the current epoch-millis timestamp.
    pub fn new(payload: P) -> Self {
        Self {
            id: Uuid::now_v7(),
            timestamp: Utc::now().timestamp_millis(),
            event_type: P::EVENT_TYPE,
            payload,
        }
    }
}
