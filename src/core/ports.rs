// Ports define what the worker needs from the outside world, without implementing it.
//
// Purpose
// - Describe abstract input and output capabilities as traits (QueueTransport,
//   EventHandler, UserService).
//
// Boundaries
// - No concrete input or output here. Adapters implement these traits in the
//   adapters layer; a production deployment supplies its own transport client.
//
// Testing guidance
// - Use the in memory implementations for tests and local development.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::core::event::{EventEnvelope, EventPayload};
use crate::core::user::User;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("receive failed: {0}")]
    Receive(String),

    #[error("acknowledge failed: {0}")]
    Acknowledge(String),
}

/// One message as delivered by the queue. Body and receipt handle are optional
/// because the transport does not guarantee either; the consumer validates both.
#[derive(Debug, Clone)]
pub struct RawMessage {
    pub message_id: Option<String>,
    pub body: Option<String>,
    pub receipt_handle: Option<String>,
}

/// Parameters for one long-poll against a queue.
#[derive(Debug, Clone)]
pub struct ReceiveRequest {
    pub queue_url: String,
    pub max_messages: usize,
    pub visibility_timeout: Duration,
    pub wait_time: Duration,
}

/// Queue transport capability: long-poll for a batch, acknowledge by receipt handle.
///
/// Any receive failure is treated as retryable by the consumer. An un-acknowledged
/// message becomes visible again once its lease expires (at-least-once delivery).
#[async_trait]
pub trait QueueTransport: Send + Sync {
    async fn receive(&self, request: &ReceiveRequest) -> Result<Vec<RawMessage>, TransportError>;

    async fn acknowledge(
        &self,
        queue_url: &str,
        receipt_handle: &str,
    ) -> Result<(), TransportError>;
}

/// Business reaction to one event type. Handlers must be idempotent: redelivery
/// re-invokes them with the same payload.
#[async_trait]
pub trait EventHandler<P: EventPayload>: Send + Sync {
    async fn handle_event(&self, event: &EventEnvelope<P>) -> anyhow::Result<()>;
}

/// Read access to the user entity, supplied by the surrounding application.
#[async_trait]
pub trait UserService: Send + Sync {
    async fn get_user(&self, id: Uuid) -> anyhow::Result<Option<User>>;
}
