//! Authentication service composing credential checks, tokens and role guards

use std::sync::Arc;

use crate::domain::auth::{AuthError, Identity, IssuedToken, RoleGuard, TokenIssuer, TokenVerifier};
use crate::domain::user::User;
use crate::infrastructure::observability::{
    record_access_decision, record_login, record_token_verification,
};

use super::credentials::CredentialValidator;

/// Successful login
#[derive(Debug, Clone)]
pub struct LoginResult {
    pub issued: IssuedToken,
    pub user: User,
}

/// Entry point for authentication and authorization
#[derive(Debug, Clone)]
pub struct AuthService {
    credentials: CredentialValidator,
    issuer: Arc<dyn TokenIssuer>,
    verifier: Arc<dyn TokenVerifier>,
}

impl AuthService {
    pub fn new(
        credentials: CredentialValidator,
        issuer: Arc<dyn TokenIssuer>,
        verifier: Arc<dyn TokenVerifier>,
    ) -> Self {
        Self {
            credentials,
            issuer,
            verifier,
        }
    }

    /// Validate credentials and issue a token
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResult, AuthError> {
        let result = self.try_login(email, password).await;

        match &result {
            Ok(login) => {
                record_login("success");
                tracing::info!(user_id = %login.user.id(), "User logged in");
            }
            Err(e) => {
                record_login(e.kind());
                tracing::warn!(reason = e.kind(), "Login failed");
            }
        }

        result
    }

    async fn try_login(&self, email: &str, password: &str) -> Result<LoginResult, AuthError> {
        let user = self.credentials.validate_user(email, password).await?;
        let issued = self.issuer.issue(&user.identity())?;

        Ok(LoginResult { issued, user })
    }

    /// Verify a bearer token and recover its identity
    pub fn authenticate(&self, token: &str) -> Result<Identity, AuthError> {
        let result = self.verifier.verify(token);

        match &result {
            Ok(identity) => {
                record_token_verification("success");
                tracing::debug!(user_id = identity.user_id(), "Token verified");
            }
            Err(e) => {
                record_token_verification(e.kind());
                tracing::debug!(reason = e.kind(), "Token rejected");
            }
        }

        result
    }

    /// Check an identity against a role guard
    pub fn authorize(&self, identity: &Identity, guard: &RoleGuard) -> Result<(), AuthError> {
        let result = guard.check(identity);

        match &result {
            Ok(()) => record_access_decision("allowed"),
            Err(_) => {
                record_access_decision("denied");
                tracing::warn!(
                    user_id = identity.user_id(),
                    roles = %identity.roles(),
                    required = %guard.required(),
                    "Access denied"
                );
            }
        }

        result
    }
}
