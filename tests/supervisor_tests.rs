// Supervisor behaviour: restart-with-backoff, isolation between consumers,
// coordinated and idempotent shutdown.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use user_events::adapters::in_memory::queue::InMemoryQueue;
use user_events::application::consumer::{EventConsumer, QueueConsumer, QueueOptions};
use user_events::application::serializer::JsonEventSerializer;
use user_events::application::supervisor::ConsumerSupervisor;
use user_events::core::event::user::{UserCreated, UserCreatedPayload};
use user_events::core::ports::{EventHandler, QueueTransport};

const QUEUE: &str = "queue://users/created";
const BACKOFF: Duration = Duration::from_secs(5);

/// Crashes immediately on every start.
struct CrashingConsumer {
    starts: AtomicUsize,
}

impl CrashingConsumer {
    fn new() -> Self {
        Self {
            starts: AtomicUsize::new(0),
        }
    }

    fn starts(&self) -> usize {
        self.starts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EventConsumer for CrashingConsumer {
    fn name(&self) -> &str {
        "crashing-consumer"
    }

    async fn start(&self, _shutdown: CancellationToken) -> anyhow::Result<()> {
        self.starts.fetch_add(1, Ordering::SeqCst);
        anyhow::bail!("boom");
    }
}

/// Returns Ok after a short pause, without being cancelled.
struct ShortLivedConsumer {
    starts: AtomicUsize,
}

#[async_trait]
impl EventConsumer for ShortLivedConsumer {
    fn name(&self) -> &str {
        "short-lived-consumer"
    }

    async fn start(&self, _shutdown: CancellationToken) -> anyhow::Result<()> {
        self.starts.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(10)).await;
        Ok(())
    }
}

/// Ignores the shutdown token entirely.
struct StubbornConsumer;

#[async_trait]
impl EventConsumer for StubbornConsumer {
    fn name(&self) -> &str {
        "stubborn-consumer"
    }

    async fn start(&self, _shutdown: CancellationToken) -> anyhow::Result<()> {
        loop {
            tokio::time::sleep(Duration::from_secs(3600)).await;
        }
    }
}

/// Acknowledges everything it can deserialize.
struct AcceptingHandler;

#[async_trait]
impl EventHandler<UserCreatedPayload> for AcceptingHandler {
    async fn handle_event(&self, _event: &UserCreated) -> anyhow::Result<()> {
        Ok(())
    }
}

#[tokio::test(start_paused = true)]
async fn it_should_restart_a_crashed_consumer_after_the_backoff() {
    let consumer = Arc::new(CrashingConsumer::new());
    let supervisor =
        ConsumerSupervisor::with_backoff(vec![Arc::clone(&consumer) as Arc<dyn EventConsumer>], BACKOFF);
    supervisor.start().await;

    // First start happens right away; the restart waits out the full backoff.
    tokio::time::sleep(Duration::from_secs(1)).await;
    assert_eq!(consumer.starts(), 1);

    tokio::time::sleep(BACKOFF).await;
    assert_eq!(consumer.starts(), 2);

    // Restart-forever under persistent failure.
    tokio::time::sleep(BACKOFF * 3).await;
    assert_eq!(consumer.starts(), 5);

    supervisor.stop().await;
}

#[tokio::test(start_paused = true)]
async fn it_should_restart_immediately_after_a_normal_exit() {
    let consumer = Arc::new(ShortLivedConsumer {
        starts: AtomicUsize::new(0),
    });
    let supervisor =
        ConsumerSupervisor::with_backoff(vec![Arc::clone(&consumer) as Arc<dyn EventConsumer>], BACKOFF);
    supervisor.start().await;

    // Well inside a single backoff window the consumer has been restarted many
    // times: a normal exit does not pay the crash backoff.
    tokio::time::sleep(Duration::from_secs(1)).await;
    assert!(consumer.starts.load(Ordering::SeqCst) > 10);

    supervisor.stop().await;
}

#[tokio::test(start_paused = true)]
async fn it_should_keep_siblings_running_while_one_consumer_crashes() {
    let crashing = Arc::new(CrashingConsumer::new());

    let queue = Arc::new(InMemoryQueue::new());
    let event = UserCreated::new(UserCreatedPayload {
        id: Uuid::now_v7(),
        email: "ada@example.com".to_string(),
        name: "Ada".to_string(),
        age: None,
    });
    let raw = JsonEventSerializer.serialize(&event).unwrap();
    queue.send(QUEUE, &raw).await;

    let mut options = QueueOptions::new(QUEUE);
    options.wait_time = Duration::from_millis(50);
    let healthy = Arc::new(QueueConsumer::new(
        Arc::clone(&queue) as Arc<dyn QueueTransport>,
        Arc::new(AcceptingHandler) as Arc<dyn EventHandler<UserCreatedPayload>>,
        JsonEventSerializer,
        options,
    ));

    let supervisor = ConsumerSupervisor::with_backoff(
        vec![
            Arc::clone(&crashing) as Arc<dyn EventConsumer>,
            healthy as Arc<dyn EventConsumer>,
        ],
        BACKOFF,
    );
    supervisor.start().await;

    tokio::time::sleep(BACKOFF * 3).await;
    assert!(crashing.starts() >= 3, "crashing consumer keeps restarting");
    assert_eq!(queue.acked_count(QUEUE).await, 1, "sibling stays unaffected");

    supervisor.stop().await;
}

#[tokio::test(start_paused = true)]
async fn it_should_stop_idempotently_and_not_restart_afterwards() {
    let consumer = Arc::new(CrashingConsumer::new());
    let supervisor =
        ConsumerSupervisor::with_backoff(vec![Arc::clone(&consumer) as Arc<dyn EventConsumer>], BACKOFF);
    supervisor.start().await;

    tokio::time::sleep(Duration::from_secs(1)).await;
    supervisor.stop().await;
    let starts_at_stop = consumer.starts();

    tokio::time::sleep(BACKOFF * 4).await;
    assert_eq!(consumer.starts(), starts_at_stop);

    // Second stop is a no-op.
    supervisor.stop().await;
}

#[tokio::test(start_paused = true)]
async fn it_should_stop_within_bounded_time_even_for_a_stubborn_consumer() {
    let supervisor = ConsumerSupervisor::new(vec![Arc::new(StubbornConsumer) as Arc<dyn EventConsumer>]);
    supervisor.start().await;
    tokio::time::sleep(Duration::from_secs(1)).await;

    tokio::time::timeout(Duration::from_secs(60), supervisor.stop())
        .await
        .expect("stop must not hang on a consumer that ignores cancellation");
}
