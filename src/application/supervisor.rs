// Supervisor: keep every registered consumer alive for the lifetime of the process.
//
// Purpose
// - Run each consumer in its own task under a restart-with-backoff strategy and
//   provide coordinated shutdown.
//
// Responsibilities
// - A crashing consumer is logged and restarted after the backoff; siblings are
//   never affected, so the process runs degraded instead of dying.
// - Cancellation always wins over the restart policy: the backoff sleep and the
//   running consumer are both raced against the shared token.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::application::consumer::EventConsumer;

pub const DEFAULT_RESTART_BACKOFF: Duration = Duration::from_millis(5000);

pub struct ConsumerSupervisor {
    consumers: Vec<Arc<dyn EventConsumer>>,
    backoff: Duration,
    shutdown: CancellationToken,
    workers: Mutex<Vec<JoinHandle<()>>>,
}

impl ConsumerSupervisor {
    pub fn new(consumers: Vec<Arc<dyn EventConsumer>>) -> Self {
        Self::with_backoff(consumers, DEFAULT_RESTART_BACKOFF)
    }

    pub fn with_backoff(consumers: Vec<Arc<dyn EventConsumer>>, backoff: Duration) -> Self {
        Self {
            consumers,
            backoff,
            shutdown: CancellationToken::new(),
            workers: Mutex::new(Vec::new()),
        }
    }

    /// Launch one restart loop per consumer.
    pub async fn start(&self) {
        info!(
            consumer_count = self.consumers.len(),
            "starting consumer supervisor"
        );

        let mut workers = self.workers.lock().await;
        for consumer in &self.consumers {
            let consumer = Arc::clone(consumer);
            let shutdown = self.shutdown.clone();
            let backoff = self.backoff;

            workers.push(tokio::spawn(async move {
                while !shutdown.is_cancelled() {
                    info!(consumer = consumer.name(), "starting consumer");

                    let result = tokio::select! {
                        _ = shutdown.cancelled() => break,
                        result = consumer.start(shutdown.clone()) => result,
                    };

                    match result {
                        // Normal exit: loop again. The while condition catches the
                        // case where start returned because of cancellation.
                        Ok(()) => continue,
                        Err(err) => {
                            error!(
                                consumer = consumer.name(),
                                %err,
                                backoff_ms = backoff.as_millis() as u64,
                                "consumer crashed, restarting after backoff"
                            );
                            tokio::select! {
                                _ = shutdown.cancelled() => break,
                                _ = sleep(backoff) => {}
                            }
                        }
                    }
                }
            }));
        }
    }

    /// Signal cancellation to every restart loop and in-flight consumer operation,
    /// then wait for the worker tasks to exit. Safe to call from any task and
    /// idempotent: a second call finds nothing left to cancel or join.
    pub async fn stop(&self) {
        info!("shutting down consumer supervisor");
        self.shutdown.cancel();

        let workers = std::mem::take(&mut *self.workers.lock().await);
        for worker in workers {
            if let Err(err) = worker.await {
                error!(%err, "consumer worker task did not shut down cleanly");
            }
        }
    }
}
