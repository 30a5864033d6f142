// User lifecycle event payloads and their typed envelope aliases.
//
// Purpose
// - Carry the snapshot fields downstream reactions need for each user.* event.
//
// Versioning and evolution
// - Prefer adding optional fields. A breaking change means a new tag and a new payload type.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::event::{EventEnvelope, EventPayload, EventType};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserCreatedPayload {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub age: Option<i32>,
}

impl EventPayload for UserCreatedPayload {
    const EVENT_TYPE: EventType = EventType::UserCreated;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserUpdatedPayload {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub age: Option<i32>,
}

impl EventPayload for UserUpdatedPayload {
    const EVENT_TYPE: EventType = EventType::UserUpdated;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserDeletedPayload {
    pub id: Uuid,
}

impl EventPayload for UserDeletedPayload {
    const EVENT_TYPE: EventType = EventType::UserDeleted;
}

pub type UserCreated = EventEnvelope<UserCreatedPayload>;
pub type UserUpdated = EventEnvelope<UserUpdatedPayload>;
pub type UserDeleted = EventEnvelope<UserDeletedPayload>;

#[cfg(test)]
mod user_event_tests {
    use std::fs;

    use rstest::{fixture, rstest};
    use uuid::uuid;

    use super::*;

    #[fixture]
    fn created_event() -> UserCreated {
        EventEnvelope {
            id: uuid!("01890a5d-ac96-774b-bcce-b302099a8057"),
            timestamp: 1_700_000_000_000,
            event_type: EventType::UserCreated,
            payload: UserCreatedPayload {
                id: uuid!("01890a5d-ac96-774b-bcce-b302099a8058"),
                email: "ada@example.com".to_string(),
                name: "Ada".to_string(),
                age: Some(36),
            },
        }
    }

    #[rstest]
    fn it_should_stamp_the_matching_type_tag() {
        let event = UserDeleted::new(UserDeletedPayload {
            id: uuid!("01890a5d-ac96-774b-bcce-b302099a8058"),
        });
        assert_eq!(event.event_type, EventType::UserDeleted);
    }

    #[rstest]
    fn it_should_generate_a_unique_id_per_envelope() {
        let payload = UserDeletedPayload {
            id: uuid!("01890a5d-ac96-774b-bcce-b302099a8058"),
        };
        let first = UserDeleted::new(payload.clone());
        let second = UserDeleted::new(payload);
        assert_ne!(first.id, second.id);
    }

    #[fixture]
    fn golden_created_event_json() -> serde_json::Value {
        let s = fs::read_to_string("tests/fixtures/events/user_created_v1.json").unwrap();
        serde_json::from_str(&s).unwrap()
    }

    #[rstest]
    fn it_serializes_created_event_stable(
        created_event: UserCreated,
        golden_created_event_json: serde_json::Value,
    ) {
        let json = serde_json::to_value(&created_event).unwrap();
        assert_eq!(json, golden_created_event_json);
    }
}
