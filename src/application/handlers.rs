// Handlers for the user.* events.
//
// Purpose
// - Representative downstream reactions: re-read the affected user through the
//   UserService port and log what was found.
//
// Testing guidance
// - Pair with the in memory UserService adapter; toggle it offline to exercise
//   handler failures.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{error, info, warn};

use crate::core::event::user::{UserCreated, UserCreatedPayload, UserDeleted, UserDeletedPayload, UserUpdated, UserUpdatedPayload};
use crate::core::ports::{EventHandler, UserService};

pub struct UserCreatedHandler {
    service: Arc<dyn UserService>,
}

impl UserCreatedHandler {
    pub fn new(service: Arc<dyn UserService>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl EventHandler<UserCreatedPayload> for UserCreatedHandler {
    async fn handle_event(&self, event: &UserCreated) -> anyhow::Result<()> {
        info!(event_id = %event.id, "handling user.created event");

        let Some(user) = self.service.get_user(event.payload.id).await? else {
            warn!(
                event_id = %event.id,
                user_id = %event.payload.id,
                "user not found for user.created event"
            );
            return Ok(());
        };

        info!(
            event_id = %event.id,
            name = %user.name,
            email = %user.email,
            "fetched user for user.created event"
        );
        Ok(())
    }
}

pub struct UserUpdatedHandler {
    service: Arc<dyn UserService>,
}

impl UserUpdatedHandler {
    pub fn new(service: Arc<dyn UserService>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl EventHandler<UserUpdatedPayload> for UserUpdatedHandler {
    async fn handle_event(&self, event: &UserUpdated) -> anyhow::Result<()> {
        info!(event_id = %event.id, "handling user.updated event");

        let Some(user) = self.service.get_user(event.payload.id).await? else {
            warn!(
                event_id = %event.id,
                user_id = %event.payload.id,
                "user not found for user.updated event"
            );
            return Ok(());
        };

        info!(
            event_id = %event.id,
            name = %user.name,
            email = %user.email,
            "fetched user for user.updated event"
        );
        Ok(())
    }
}

pub struct UserDeletedHandler {
    service: Arc<dyn UserService>,
}

impl UserDeletedHandler {
    pub fn new(service: Arc<dyn UserService>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl EventHandler<UserDeletedPayload> for UserDeletedHandler {
    async fn handle_event(&self, event: &UserDeleted) -> anyhow::Result<()> {
        info!(event_id = %event.id, "handling user.deleted event");

        let Some(user) = self.service.get_user(event.payload.id).await? else {
            info!(
                event_id = %event.id,
                user_id = %event.payload.id,
                "user was confirmed to be deleted for user.deleted event"
            );
            return Ok(());
        };

        error!(
            event_id = %event.id,
            name = %user.name,
            email = %user.email,
            "was able to fetch user for user.deleted event"
        );
        Ok(())
    }
}
