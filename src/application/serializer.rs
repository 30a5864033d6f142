// JSON serializer for event envelopes.
//
// Purpose
// - Convert typed envelopes to and from the one-envelope-per-message-body wire text.
//
// Responsibilities
// - Round-trip losslessly: deserialize(serialize(e)) == e.
// - Reject payloads whose embedded type tag does not match the expected payload type.
// - Ignore unknown fields (forward compatibility); fail on missing required fields.

use thiserror::Error;

use crate::core::event::{EventEnvelope, EventPayload, EventType};

#[derive(Debug, Error)]
pub enum SerializerError {
    #[error("malformed event json: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("event type mismatch: expected {expected}, found {found}")]
    TypeMismatch {
        expected: EventType,
        found: EventType,
    },
}

#[derive(Debug, Clone, Copy, Default)]
pub struct JsonEventSerializer;

impl JsonEventSerializer {
    pub fn serialize<P: EventPayload>(
        &self,
        event: &EventEnvelope<P>,
    ) -> Result<String, SerializerError> {
        if event.event_type != P::EVENT_TYPE {
            return Err(SerializerError::TypeMismatch {
                expected: P::EVENT_TYPE,
                found: event.event_type,
            });
        }
        Ok(serde_json::to_string(event)?)
    }

    pub fn deserialize<P: EventPayload>(
        &self,
        raw: &str,
    ) -> Result<EventEnvelope<P>, SerializerError> {
        let event: EventEnvelope<P> = serde_json::from_str(raw)?;
        if event.event_type != P::EVENT_TYPE {
            return Err(SerializerError::TypeMismatch {
                expected: P::EVENT_TYPE,
                found: event.event_type,
            });
        }
        Ok(event)
    }
}
