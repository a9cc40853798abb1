//! Domain layer - Core entities, policies, and error types

pub mod auth;
pub mod error;
pub mod user;

pub use auth::{AuthError, Identity, IssuedToken, RoleGuard, TokenIssuer, TokenVerifier};
pub use error::DomainError;
pub use user::{Role, RoleSet, User, UserId, UserRepository, UserStatus};
