//! Authentication and authorization errors

use thiserror::Error;

use crate::domain::DomainError;

/// Failures of the authentication core.
///
/// Each variant maps to its own HTTP outcome so callers can tell an expired
/// session (prompt re-login) apart from a forged or garbled token (reject).
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Failed to sign token: {message}")]
    Signing { message: String },

    #[error("Invalid token: {message}")]
    InvalidToken { message: String },

    #[error("Token has expired")]
    ExpiredToken,

    #[error("Access denied: {message}")]
    AccessDenied { message: String },

    #[error("User store error: {0}")]
    Store(#[from] DomainError),
}

impl AuthError {
    pub fn signing(message: impl Into<String>) -> Self {
        Self::Signing {
            message: message.into(),
        }
    }

    pub fn invalid_token(message: impl Into<String>) -> Self {
        Self::InvalidToken {
            message: message.into(),
        }
    }

    pub fn access_denied(message: impl Into<String>) -> Self {
        Self::AccessDenied {
            message: message.into(),
        }
    }

    /// Short label used for metrics and logs
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidCredentials => "invalid_credentials",
            Self::Signing { .. } => "signing_error",
            Self::InvalidToken { .. } => "invalid_token",
            Self::ExpiredToken => "token_expired",
            Self::AccessDenied { .. } => "access_denied",
            Self::Store(_) => "store_error",
        }
    }
}
