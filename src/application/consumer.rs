// Single-queue consumer: poll, dispatch, acknowledge.
//
// Purpose
// - Run one fetch-and-handle loop against one queue, bound to one event type and
//   one handler, until the shutdown token is cancelled.
//
// Responsibilities
// - Treat poll failures as retryable: log, back off, poll again.
// - Dispatch the messages of a batch concurrently and join before the next poll;
//   the per-message visibility lease is a shared, limited resource and serial
//   processing of a large batch risks lease expiry and duplicate delivery.
// - Acknowledge a message only after its handler succeeded. A failed message stays
//   un-acked and is redelivered once its lease expires.
//
// Boundaries
// - Per-message failures never escape the batch join; nothing here stops the loop
//   except cancellation.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::future::join_all;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::application::serializer::{JsonEventSerializer, SerializerError};
use crate::core::event::EventPayload;
use crate::core::ports::{EventHandler, QueueTransport, RawMessage, ReceiveRequest, TransportError};

/// Per-consumer queue configuration. Built once at startup, immutable afterwards.
#[derive(Debug, Clone)]
pub struct QueueOptions {
    pub queue_url: String,
    pub max_number_of_messages: usize,
    pub visibility_timeout: Duration,
    pub wait_time: Duration,
    pub error_backoff: Duration,
}

impl QueueOptions {
    pub fn new(queue_url: impl Into<String>) -> Self {
        Self {
            queue_url: queue_url.into(),
            max_number_of_messages: 10,
            visibility_timeout: Duration::from_secs(30),
            wait_time: Duration::from_secs(20),
            error_backoff: Duration::from_millis(5000),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConsumerError {
    #[error("message body not found")]
    MessageBodyMissing,

    #[error("message receipt handle not found")]
    MessageHandleMissing,

    #[error("error deserializing message body: {0}")]
    Deserialization(#[source] SerializerError),

    #[error("error handling event: {0}")]
    Handler(#[source] anyhow::Error),

    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// Lifecycle surface the supervisor drives. `start` runs until the token is
/// cancelled; returning an error counts as a crash and triggers a restart.
#[async_trait]
pub trait EventConsumer: Send + Sync {
    fn name(&self) -> &str;

    async fn start(&self, shutdown: CancellationToken) -> anyhow::Result<()>;
}

/// Consumer for one queue carrying one event type.
pub struct QueueConsumer<P: EventPayload> {
    name: String,
    transport: Arc<dyn QueueTransport>,
    handler: Arc<dyn EventHandler<P>>,
    serializer: JsonEventSerializer,
    options: QueueOptions,
}

impl<P: EventPayload> QueueConsumer<P> {
    pub fn new(
        transport: Arc<dyn QueueTransport>,
        handler: Arc<dyn EventHandler<P>>,
        serializer: JsonEventSerializer,
        options: QueueOptions,
    ) -> Self {
        Self {
            name: format!("{}-consumer", P::EVENT_TYPE),
            transport,
            handler,
            serializer,
            options,
        }
    }

    /// One poll plus the dispatch of everything it returned. Poll failures are
    /// retryable: log, sleep the error backoff, let the outer loop poll again.
    async fn fetch_and_handle_batch(&self) {
        let request = ReceiveRequest {
            queue_url: self.options.queue_url.clone(),
            max_messages: self.options.max_number_of_messages,
            visibility_timeout: self.options.visibility_timeout,
            wait_time: self.options.wait_time,
        };

        let messages = match self.transport.receive(&request).await {
            Ok(messages) => messages,
            Err(err) => {
                error!(
                    queue_url = %self.options.queue_url,
                    %err,
                    "encountered error while fetching batch of messages"
                );
                tokio::time::sleep(self.options.error_backoff).await;
                return;
            }
        };

        if messages.is_empty() {
            return;
        }

        // Concurrent per message; the batch is the join point.
        join_all(messages.iter().map(|message| self.dispatch(message))).await;

        debug!(
            queue_url = %self.options.queue_url,
            message_count = messages.len(),
            "finished processing batch of messages"
        );
    }

    /// Isolate one message: any failure is logged with queue and message identity
    /// and must not affect siblings in the same batch.
    async fn dispatch(&self, message: &RawMessage) {
        if let Err(err) = self.handle_message(message).await {
            error!(
                queue_url = %self.options.queue_url,
                message_id = message.message_id.as_deref().unwrap_or("<unknown>"),
                %err,
                "message processing failed"
            );
        }
    }

    async fn handle_message(&self, message: &RawMessage) -> Result<(), ConsumerError> {
        let body = message
            .body
            .as_deref()
            .ok_or(ConsumerError::MessageBodyMissing)?;
        let receipt_handle = message
            .receipt_handle
            .as_deref()
            .ok_or(ConsumerError::MessageHandleMissing)?;

        let event = self
            .serializer
            .deserialize::<P>(body)
            .map_err(ConsumerError::Deserialization)?;

        self.handler
            .handle_event(&event)
            .await
            .map_err(ConsumerError::Handler)?;

        self.ack(receipt_handle).await
    }

    async fn ack(&self, receipt_handle: &str) -> Result<(), ConsumerError> {
        self.transport
            .acknowledge(&self.options.queue_url, receipt_handle)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl<P: EventPayload> EventConsumer for QueueConsumer<P> {
    fn name(&self) -> &str {
        &self.name
    }

    async fn start(&self, shutdown: CancellationToken) -> anyhow::Result<()> {
        info!(
            consumer = %self.name,
            queue_url = %self.options.queue_url,
            "starting queue consumer"
        );

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => return Ok(()),
                _ = self.fetch_and_handle_batch() => {}
            }
        }
    }
}
