//! Application state for shared services

use std::sync::Arc;

use crate::domain::{DomainError, User};
use crate::infrastructure::auth::AuthService;
use crate::infrastructure::user::{CreateUserRequest, UserService};

/// Application state shared by every handler
#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<AuthService>,
    pub user_service: Arc<dyn UserServiceTrait>,
}

/// User management operations used by the HTTP layer
#[async_trait::async_trait]
pub trait UserServiceTrait: Send + Sync {
    async fn create(&self, request: CreateUserRequest) -> Result<User, DomainError>;
    async fn list(&self) -> Result<Vec<User>, DomainError>;
    async fn get(&self, id: &str) -> Result<Option<User>, DomainError>;
    async fn update_role(&self, id: &str, role: &str) -> Result<User, DomainError>;
    async fn suspend(&self, id: &str) -> Result<User, DomainError>;
    async fn activate(&self, id: &str) -> Result<User, DomainError>;
    async fn delete(&self, id: &str) -> Result<bool, DomainError>;
    async fn count(&self) -> Result<usize, DomainError>;
}

#[async_trait::async_trait]
impl UserServiceTrait for UserService {
    async fn create(&self, request: CreateUserRequest) -> Result<User, DomainError> {
        UserService::create(self, request).await
    }

    async fn list(&self) -> Result<Vec<User>, DomainError> {
        UserService::list(self).await
    }

    async fn get(&self, id: &str) -> Result<Option<User>, DomainError> {
        UserService::get(self, id).await
    }

    async fn update_role(&self, id: &str, role: &str) -> Result<User, DomainError> {
        UserService::update_role(self, id, role).await
    }

    async fn suspend(&self, id: &str) -> Result<User, DomainError> {
        UserService::suspend(self, id).await
    }

    async fn activate(&self, id: &str) -> Result<User, DomainError> {
        UserService::activate(self, id).await
    }

    async fn delete(&self, id: &str) -> Result<bool, DomainError> {
        UserService::delete(self, id).await
    }

    async fn count(&self) -> Result<usize, DomainError> {
        UserService::count(self).await
    }
}

impl AppState {
    pub fn new(auth_service: Arc<AuthService>, user_service: Arc<dyn UserServiceTrait>) -> Self {
        Self {
            auth_service,
            user_service,
        }
    }
}
