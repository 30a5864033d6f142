// In memory implementation of the UserService port.
//
// Purpose
// - Support handler tests and local development without a database.
//
// Testing guidance
// - `toggle_offline` makes get_user fail to exercise handler failures.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::anyhow;
use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::core::ports::UserService;
use crate::core::user::User;

#[derive(Default)]
pub struct InMemoryUsers {
    inner: RwLock<HashMap<Uuid, User>>,
    offline: AtomicBool,
}

impl InMemoryUsers {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, user: User) {
        self.inner.write().await.insert(user.id, user);
    }

    pub async fn remove(&self, id: Uuid) {
        self.inner.write().await.remove(&id);
    }

    pub fn toggle_offline(&self) {
        self.offline.fetch_xor(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl UserService for InMemoryUsers {
    async fn get_user(&self, id: Uuid) -> anyhow::Result<Option<User>> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(anyhow!("user service offline"));
        }
        Ok(self.inner.read().await.get(&id).cloned())
    }
}

#[cfg(test)]
mod in_memory_users_tests {
    use chrono::Utc;
    use rstest::rstest;

    use super::*;

    fn some_user() -> User {
        User {
            id: Uuid::now_v7(),
            email: "ada@example.com".to_string(),
            name: "Ada".to_string(),
            age: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_store_and_fetch_a_user() {
        let users = InMemoryUsers::new();
        let user = some_user();
        users.insert(user.clone()).await;

        let fetched = users.get_user(user.id).await.expect("get_user failed");
        assert_eq!(fetched, Some(user));
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_return_none_for_a_removed_user() {
        let users = InMemoryUsers::new();
        let user = some_user();
        users.insert(user.clone()).await;
        users.remove(user.id).await;

        let fetched = users.get_user(user.id).await.expect("get_user failed");
        assert_eq!(fetched, None);
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_fail_while_offline() {
        let users = InMemoryUsers::new();
        users.toggle_offline();
        assert!(users.get_user(Uuid::now_v7()).await.is_err());
    }
}
