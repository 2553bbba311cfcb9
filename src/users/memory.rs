use std::collections::BTreeMap;

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::RwLock;

use crate::users::{
    repo::{StoreError, UserStore},
    repo_types::{NewUser, User},
};

/// Process-local store keyed by id. Check-and-insert happens under one write lock.
#[derive(Default)]
pub struct InMemoryUserStore {
    users: RwLock<BTreeMap<i64, User>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn list(&self) -> Result<Vec<User>, StoreError> {
        Ok(self.users.read().await.values().cloned().collect())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.email == email).cloned())
    }

    async fn create(&self, user: NewUser) -> Result<i64, StoreError> {
        let mut users = self.users.write().await;
        if users.values().any(|u| u.email == user.email) {
            return Err(StoreError::DuplicateEmail(user.email));
        }
        let id = users.keys().next_back().map_or(1, |max| max + 1);
        users.insert(
            id,
            User {
                id,
                email: user.email,
                password_hash: user.password_hash,
                name: user.name,
                country: user.country,
                city: user.city,
                created_at: OffsetDateTime::now_utc(),
            },
        );
        Ok(id)
    }

    async fn delete_by_email(&self, email: &str) -> Result<u64, StoreError> {
        let mut users = self.users.write().await;
        let before = users.len();
        users.retain(|_, u| u.email != email);
        Ok((before - users.len()) as u64)
    }
}
