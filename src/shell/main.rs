// Composition root for the worker process.
//
// Responsibilities
// - Read config from environment.
// - Instantiate concrete infrastructure implementations.
// - Wire one consumer per user.* queue into the supervisor.
// - Start the supervisor and stop it on SIGINT for graceful termination.

use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;

use user_events::adapters::in_memory::queue::InMemoryQueue;
use user_events::adapters::in_memory::users::InMemoryUsers;
use user_events::application::consumer::{EventConsumer, QueueConsumer, QueueOptions};
use user_events::application::handlers::{
    UserCreatedHandler, UserDeletedHandler, UserUpdatedHandler,
};
use user_events::application::serializer::JsonEventSerializer;
use user_events::application::supervisor::ConsumerSupervisor;
use user_events::core::event::user::{UserCreatedPayload, UserDeletedPayload, UserUpdatedPayload};
use user_events::core::ports::{EventHandler, QueueTransport};
use user_events::shell::config::WorkerSettings;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    WorkerSettings::read_env_files();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let settings = WorkerSettings::from_env();
    info!("starting worker process");

    // Local-development transport and user store. A production deployment swaps
    // these for real QueueTransport and UserService implementations.
    let transport: Arc<dyn QueueTransport> = Arc::new(InMemoryQueue::new());
    let users = Arc::new(InMemoryUsers::new());
    let serializer = JsonEventSerializer;

    let created_handler: Arc<dyn EventHandler<UserCreatedPayload>> =
        Arc::new(UserCreatedHandler::new(users.clone()));
    let updated_handler: Arc<dyn EventHandler<UserUpdatedPayload>> =
        Arc::new(UserUpdatedHandler::new(users.clone()));
    let deleted_handler: Arc<dyn EventHandler<UserDeletedPayload>> =
        Arc::new(UserDeletedHandler::new(users.clone()));

    let consumers: Vec<Arc<dyn EventConsumer>> = vec![
        Arc::new(QueueConsumer::new(
            Arc::clone(&transport),
            created_handler,
            serializer,
            QueueOptions::new(settings.queue_url_user_created.clone()),
        )),
        Arc::new(QueueConsumer::new(
            Arc::clone(&transport),
            updated_handler,
            serializer,
            QueueOptions::new(settings.queue_url_user_updated.clone()),
        )),
        Arc::new(QueueConsumer::new(
            Arc::clone(&transport),
            deleted_handler,
            serializer,
            QueueOptions::new(settings.queue_url_user_deleted.clone()),
        )),
    ];

    let supervisor = ConsumerSupervisor::with_backoff(consumers, settings.restart_backoff);
    supervisor.start().await;

    tokio::signal::ctrl_c().await?;
    info!("shutting down worker process");
    supervisor.stop().await;

    Ok(())
}
