// In memory implementation of the QueueTransport port.
//
// Purpose
// - Support consumer and supervisor tests and local development without a real queue.
//
// Responsibilities
// - Hold pending messages per queue url, move received messages into an in-flight
//   map keyed by receipt handle, and record acknowledged messages.
// - Simulate long-polling by waiting `wait_time` once when a queue is empty.
// - Visibility leases do not expire on their own here; `release_in_flight` puts
//   leased messages back, standing in for lease expiry in redelivery tests.
//
// Testing guidance
// - `toggle_offline` makes receive and acknowledge fail to exercise transport errors.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::core::ports::{QueueTransport, RawMessage, ReceiveRequest, TransportError};

#[derive(Debug, Clone)]
struct StoredMessage {
    message_id: String,
    body: Option<String>,
}

#[derive(Default)]
struct QueueState {
    pending: VecDeque<StoredMessage>,
    in_flight: HashMap<String, StoredMessage>,
    acked: Vec<StoredMessage>,
}

#[derive(Default)]
pub struct InMemoryQueue {
    queues: RwLock<HashMap<String, QueueState>>,
    sequence: AtomicU64,
    receive_attempts: AtomicU64,
    offline: AtomicBool,
}

impl InMemoryQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueue a message body, returning the generated message id.
    pub async fn send(&self, queue_url: &str, body: &str) -> String {
        self.push(queue_url, Some(body.to_string())).await
    }

    /// Enqueue a message without a body, for malformed-message scenarios.
    pub async fn send_without_body(&self, queue_url: &str) -> String {
        self.push(queue_url, None).await
    }

    async fn push(&self, queue_url: &str, body: Option<String>) -> String {
        let message_id = format!("m-{}", self.sequence.fetch_add(1, Ordering::Relaxed));
        let mut queues = self.queues.write().await;
        queues
            .entry(queue_url.to_string())
            .or_default()
            .pending
            .push_back(StoredMessage {
                message_id: message_id.clone(),
                body,
            });
        message_id
    }

    /// Put every in-flight message of the queue back into pending, as if all
    /// visibility leases expired at once. Returns how many were released.
    pub async fn release_in_flight(&self, queue_url: &str) -> usize {
        let mut queues = self.queues.write().await;
        let Some(queue) = queues.get_mut(queue_url) else {
            return 0;
        };
        let released: Vec<StoredMessage> = queue.in_flight.drain().map(|(_, m)| m).collect();
        let count = released.len();
        queue.pending.extend(released);
        count
    }

    pub fn toggle_offline(&self) {
        self.offline.fetch_xor(true, Ordering::SeqCst);
    }

    pub fn receive_attempts(&self) -> u64 {
        self.receive_attempts.load(Ordering::SeqCst)
    }

    pub async fn pending_count(&self, queue_url: &str) -> usize {
        let queues = self.queues.read().await;
        queues.get(queue_url).map_or(0, |q| q.pending.len())
    }

    pub async fn in_flight_count(&self, queue_url: &str) -> usize {
        let queues = self.queues.read().await;
        queues.get(queue_url).map_or(0, |q| q.in_flight.len())
    }

    pub async fn acked_count(&self, queue_url: &str) -> usize {
        let queues = self.queues.read().await;
        queues.get(queue_url).map_or(0, |q| q.acked.len())
    }

    async fn take_batch(&self, request: &ReceiveRequest) -> Vec<RawMessage> {
        let mut queues = self.queues.write().await;
        let Some(queue) = queues.get_mut(&request.queue_url) else {
            return Vec::new();
        };

        let mut batch = Vec::new();
        while batch.len() < request.max_messages {
            let Some(message) = queue.pending.pop_front() else {
                break;
            };
            let receipt_handle = format!("rh-{}", self.sequence.fetch_add(1, Ordering::Relaxed));
            batch.push(RawMessage {
                message_id: Some(message.message_id.clone()),
                body: message.body.clone(),
                receipt_handle: Some(receipt_handle.clone()),
            });
            queue.in_flight.insert(receipt_handle, message);
        }
        batch
    }
}

#[async_trait]
impl QueueTransport for InMemoryQueue {
    async fn receive(&self, request: &ReceiveRequest) -> Result<Vec<RawMessage>, TransportError> {
        self.receive_attempts.fetch_add(1, Ordering::SeqCst);
        if self.offline.load(Ordering::SeqCst) {
            return Err(TransportError::Receive("queue transport offline".to_string()));
        }

        let batch = self.take_batch(request).await;
        if !batch.is_empty() {
            return Ok(batch);
        }

        // Long poll: wait once for late arrivals before returning empty-handed.
        tokio::time::sleep(request.wait_time).await;
        Ok(self.take_batch(request).await)
    }

    async fn acknowledge(
        &self,
        queue_url: &str,
        receipt_handle: &str,
    ) -> Result<(), TransportError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(TransportError::Acknowledge(
                "queue transport offline".to_string(),
            ));
        }

        let mut queues = self.queues.write().await;
        let queue = queues.get_mut(queue_url).ok_or_else(|| {
            TransportError::Acknowledge(format!("unknown queue: {queue_url}"))
        })?;
        let message = queue.in_flight.remove(receipt_handle).ok_or_else(|| {
            TransportError::Acknowledge(format!("unknown receipt handle: {receipt_handle}"))
        })?;
        queue.acked.push(message);
        Ok(())
    }
}
