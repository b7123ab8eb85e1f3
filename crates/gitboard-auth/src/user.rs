//! User records and the storage trait.
//!
//! Persistence sits behind `UserStore` so the backing store can change
//! without touching the account service. The in-memory implementation is
//! the default for single-instance deployments and tests.

use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use time::OffsetDateTime;
use uuid::Uuid;

use gitboard_store::StoreError;

/// A registered account. `password_hash` is a PHC string, never the raw
/// password.
#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: OffsetDateTime,
}

impl User {
    pub fn new(
        username: impl Into<String>,
        email: impl Into<String>,
        password_hash: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            username: username.into(),
            email: email.into(),
            password_hash: password_hash.into(),
            created_at: OffsetDateTime::now_utc(),
        }
    }
}

/// Storage for user records, keyed by unique username and unique email.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Look up by username OR email (the login `account` field).
    async fn find_by_account(&self, account: &str) -> Result<Option<User>, StoreError>;

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    async fn insert(&self, user: User) -> Result<(), StoreError>;

    /// Replace the password hash for the account with this email.
    /// Returns `false` when no such account exists.
    async fn update_password(&self, email: &str, password_hash: String)
    -> Result<bool, StoreError>;
}

/// In-memory user store backed by a concurrent map.
#[derive(Default)]
pub struct MemoryUserStore {
    users: Arc<DashMap<Uuid, User>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_account(&self, account: &str) -> Result<Option<User>, StoreError> {
        Ok(self
            .users
            .iter()
            .find(|u| u.username == account || u.email == account)
            .map(|u| u.value().clone()))
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        Ok(self
            .users
            .iter()
            .find(|u| u.username == username)
            .map(|u| u.value().clone()))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        Ok(self
            .users
            .iter()
            .find(|u| u.email == email)
            .map(|u| u.value().clone()))
    }

    async fn insert(&self, user: User) -> Result<(), StoreError> {
        self.users.insert(user.id, user);
        Ok(())
    }

    async fn update_password(
        &self,
        email: &str,
        password_hash: String,
    ) -> Result<bool, StoreError> {
        for mut entry in self.users.iter_mut() {
            if entry.email == email {
                entry.password_hash = password_hash;
                return Ok(true);
            }
        }
        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn find_by_account_matches_username_and_email() {
        let store = MemoryUserStore::new();
        store
            .insert(User::new("alice", "alice@example.com", "hash"))
            .await
            .unwrap();

        assert!(store.find_by_account("alice").await.unwrap().is_some());
        assert!(
            store
                .find_by_account("alice@example.com")
                .await
                .unwrap()
                .is_some()
        );
        assert!(store.find_by_account("bob").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn update_password_reports_missing_account() {
        let store = MemoryUserStore::new();
        store
            .insert(User::new("alice", "alice@example.com", "old"))
            .await
            .unwrap();

        assert!(
            store
                .update_password("alice@example.com", "new".into())
                .await
                .unwrap()
        );
        let user = store.find_by_email("alice@example.com").await.unwrap();
        assert_eq!(user.unwrap().password_hash, "new");

        assert!(
            !store
                .update_password("nobody@example.com", "x".into())
                .await
                .unwrap()
        );
    }
}
