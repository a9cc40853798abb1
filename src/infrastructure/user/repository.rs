//! In-memory user repository implementation

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::user::{User, UserId, UserRepository};
use crate::domain::DomainError;

#[derive(Debug, Default)]
struct Store {
    users: HashMap<String, User>,
    /// email -> user ID
    email_index: HashMap<String, String>,
    /// NIP -> user ID
    nip_index: HashMap<String, String>,
}

impl Store {
    fn index(&mut self, user: &User) {
        let id = user.id().as_str().to_string();
        self.email_index.insert(user.email().to_string(), id.clone());
        if let Some(nip) = user.nip() {
            self.nip_index.insert(nip.to_string(), id);
        }
    }

    fn unindex(&mut self, user: &User) {
        self.email_index.remove(user.email());
        if let Some(nip) = user.nip() {
            self.nip_index.remove(nip);
        }
    }

    fn check_unique(&self, user: &User) -> Result<(), DomainError> {
        let id = user.id().as_str();

        if let Some(owner) = self.email_index.get(user.email()) {
            if owner != id {
                return Err(DomainError::conflict(format!(
                    "Email '{}' is already registered",
                    user.email()
                )));
            }
        }

        if let Some(nip) = user.nip() {
            if let Some(owner) = self.nip_index.get(nip) {
                if owner != id {
                    return Err(DomainError::conflict(format!(
                        "NIP '{}' is already registered",
                        nip
                    )));
                }
            }
        }

        Ok(())
    }
}

/// In-memory implementation of UserRepository
#[derive(Debug, Clone, Default)]
pub struct InMemoryUserRepository {
    store: Arc<RwLock<Store>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a repository with initial users. Later duplicates are skipped.
    pub fn with_users(users: Vec<User>) -> Self {
        let mut store = Store::default();

        for user in users {
            if store.users.contains_key(user.id().as_str()) || store.check_unique(&user).is_err() {
                continue;
            }
            store.index(&user);
            store.users.insert(user.id().as_str().to_string(), user);
        }

        Self {
            store: Arc::new(RwLock::new(store)),
        }
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn get(&self, id: &UserId) -> Result<Option<User>, DomainError> {
        let store = self.store.read().await;
        Ok(store.users.get(id.as_str()).cloned())
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<User>, DomainError> {
        let store = self.store.read().await;

        Ok(store
            .email_index
            .get(email)
            .and_then(|id| store.users.get(id))
            .cloned())
    }

    async fn create(&self, user: User) -> Result<User, DomainError> {
        let mut store = self.store.write().await;

        let id = user.id().as_str().to_string();
        if store.users.contains_key(&id) {
            return Err(DomainError::conflict(format!(
                "User with ID '{}' already exists",
                id
            )));
        }

        store.check_unique(&user)?;
        store.index(&user);
        store.users.insert(id, user.clone());

        Ok(user)
    }

    async fn update(&self, user: &User) -> Result<User, DomainError> {
        let mut store = self.store.write().await;

        let id = user.id().as_str().to_string();
        let Some(previous) = store.users.get(&id).cloned() else {
            return Err(DomainError::not_found(format!("User '{}' not found", id)));
        };

        store.check_unique(user)?;
        store.unindex(&previous);
        store.index(user);
        store.users.insert(id, user.clone());

        Ok(user.clone())
    }

    async fn delete(&self, id: &UserId) -> Result<bool, DomainError> {
        let mut store = self.store.write().await;

        match store.users.remove(id.as_str()) {
            Some(user) => {
                store.unindex(&user);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn list(&self) -> Result<Vec<User>, DomainError> {
        let store = self.store.read().await;

        let mut users: Vec<User> = store.users.values().cloned().collect();
        users.sort_by(|a, b| {
            a.created_at()
                .cmp(&b.created_at())
                .then_with(|| a.id().as_str().cmp(b.id().as_str()))
        });

        Ok(users)
    }

    async fn count(&self) -> Result<usize, DomainError> {
        Ok(self.store.read().await.users.len())
    }

    async fn nip_exists(&self, nip: &str) -> Result<bool, DomainError> {
        Ok(self.store.read().await.nip_index.contains_key(nip))
    }

    async fn email_exists(&self, email: &str) -> Result<bool, DomainError> {
        Ok(self.store.read().await.email_index.contains_key(email))
    }

    async fn record_login(&self, id: &UserId) -> Result<(), DomainError> {
        let mut store = self.store.write().await;

        let user = store
            .users
            .get_mut(id.as_str())
            .ok_or_else(|| DomainError::not_found(format!("User '{}' not found", id)))?;
        user.record_login();
        tracing::trace!(user_id = %id, at = %Utc::now(), "Recorded login");

        Ok(())
    }
}
