//! Email and password validation against the user store

use std::sync::Arc;

use crate::domain::auth::{AuthError, Identity};
use crate::domain::user::{User, UserRepository};
use crate::infrastructure::user::{normalize_email, PasswordHasher};

/// Confirms a user's email and password before a token is issued
#[derive(Clone)]
pub struct CredentialValidator {
    repository: Arc<dyn UserRepository>,
    hasher: Arc<dyn PasswordHasher>,
}

impl std::fmt::Debug for CredentialValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialValidator")
            .field("repository", &self.repository)
            .finish_non_exhaustive()
    }
}

impl CredentialValidator {
    pub fn new(repository: Arc<dyn UserRepository>, hasher: Arc<dyn PasswordHasher>) -> Self {
        Self { repository, hasher }
    }

    /// Validate credentials and return the identity to issue a token for
    pub async fn validate(&self, email: &str, password: &str) -> Result<Identity, AuthError> {
        self.validate_user(email, password)
            .await
            .map(|user| user.identity())
    }

    /// Validate credentials and return the stored user.
    ///
    /// Unknown email, wrong password and a suspended account are
    /// indistinguishable to the caller.
    pub async fn validate_user(&self, email: &str, password: &str) -> Result<User, AuthError> {
        let email = normalize_email(email);

        let Some(user) = self.repository.get_by_email(&email).await? else {
            tracing::debug!("Login rejected: unknown email");
            return Err(AuthError::InvalidCredentials);
        };

        if !self.hasher.verify(password, user.password_hash()) {
            tracing::debug!(user_id = %user.id(), "Login rejected: wrong password");
            return Err(AuthError::InvalidCredentials);
        }

        if !user.is_active() {
            tracing::debug!(user_id = %user.id(), "Login rejected: account suspended");
            return Err(AuthError::InvalidCredentials);
        }

        self.repository.record_login(user.id()).await?;

        Ok(user)
    }
}
