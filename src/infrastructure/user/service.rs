//! User service for account management

use std::sync::Arc;

use crate::domain::user::{
    validate_email, validate_name, validate_password, Role, User, UserId, UserRepository,
};
use crate::domain::DomainError;

use super::password::PasswordHasher;

/// Request for creating a new user
#[derive(Debug, Clone)]
pub struct CreateUserRequest {
    pub email: String,
    pub name: String,
    pub password: String,
    /// Role label, parsed case-insensitively
    pub role: String,
    pub nip: Option<String>,
    pub nim: Option<String>,
}

/// Account management on top of the user store
#[derive(Clone)]
pub struct UserService {
    repository: Arc<dyn UserRepository>,
    hasher: Arc<dyn PasswordHasher>,
}

impl std::fmt::Debug for UserService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserService")
            .field("repository", &self.repository)
            .finish_non_exhaustive()
    }
}

impl UserService {
    pub fn new(repository: Arc<dyn UserRepository>, hasher: Arc<dyn PasswordHasher>) -> Self {
        Self { repository, hasher }
    }

    /// Create a new user
    pub async fn create(&self, request: CreateUserRequest) -> Result<User, DomainError> {
        let email = normalize_email(&request.email);

        validate_email(&email).map_err(|e| DomainError::validation(e.to_string()))?;
        validate_name(&request.name).map_err(|e| DomainError::validation(e.to_string()))?;
        validate_password(&request.password)
            .map_err(|e| DomainError::validation(e.to_string()))?;

        let role = request
            .role
            .parse::<Role>()
            .map_err(|e| DomainError::validation(e.to_string()))?;

        if self.repository.email_exists(&email).await? {
            return Err(DomainError::conflict("Email already registered"));
        }

        let nip = request
            .nip
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(String::from);

        if role == Role::Dosen {
            if let Some(nip) = nip.as_deref() {
                if self.repository.nip_exists(nip).await? {
                    return Err(DomainError::conflict("NIP already registered"));
                }
            }
        }

        let password_hash = self.hasher.hash(&request.password)?;

        let user = User::new(
            UserId::generate(),
            email,
            request.name.trim(),
            password_hash,
            role,
            nip,
            request.nim,
        )
        .map_err(|e| DomainError::validation(e.to_string()))?;

        let user = self.repository.create(user).await?;
        tracing::info!(user_id = %user.id(), role = %user.role(), "Created user");

        Ok(user)
    }

    /// All users ordered by creation time
    pub async fn list(&self) -> Result<Vec<User>, DomainError> {
        self.repository.list().await
    }

    /// Get a user by ID. A malformed ID is simply not found.
    pub async fn get(&self, id: &str) -> Result<Option<User>, DomainError> {
        match UserId::new(id) {
            Ok(user_id) => self.repository.get(&user_id).await,
            Err(_) => Ok(None),
        }
    }

    /// Change a user's role
    pub async fn update_role(&self, id: &str, role_label: &str) -> Result<User, DomainError> {
        let role = role_label
            .parse::<Role>()
            .map_err(|e| DomainError::validation(e.to_string()))?;

        let mut user = self.require(id).await?;

        let previous = user.role();
        user.set_role(role)
            .map_err(|e| DomainError::validation(e.to_string()))?;

        let user = self.repository.update(&user).await?;
        tracing::info!(user_id = %user.id(), from = %previous, to = %role, "Updated user role");

        Ok(user)
    }

    /// Block a user from logging in. Issued tokens stay valid until expiry.
    pub async fn suspend(&self, id: &str) -> Result<User, DomainError> {
        let mut user = self.require(id).await?;
        user.suspend();

        let user = self.repository.update(&user).await?;
        tracing::info!(user_id = %user.id(), "Suspended user");

        Ok(user)
    }

    /// Allow a suspended user to log in again
    pub async fn activate(&self, id: &str) -> Result<User, DomainError> {
        let mut user = self.require(id).await?;
        user.activate();

        let user = self.repository.update(&user).await?;
        tracing::info!(user_id = %user.id(), "Activated user");

        Ok(user)
    }

    /// Delete a user, returning whether it existed
    pub async fn delete(&self, id: &str) -> Result<bool, DomainError> {
        let Ok(user_id) = UserId::new(id) else {
            return Ok(false);
        };

        let deleted = self.repository.delete(&user_id).await?;
        if deleted {
            tracing::info!(user_id = %user_id, "Deleted user");
        }

        Ok(deleted)
    }

    pub async fn count(&self) -> Result<usize, DomainError> {
        self.repository.count().await
    }

    async fn require(&self, id: &str) -> Result<User, DomainError> {
        self.get(id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("User '{}' not found", id)))
    }
}

/// Emails are matched case-insensitively
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
