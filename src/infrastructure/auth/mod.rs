//! Authentication infrastructure module
//!
//! JWT issuance and verification, credential validation, and the
//! `AuthService` that ties them to the user store.

mod credentials;
mod jwt;
mod service;
mod signing_key;

pub use credentials::CredentialValidator;
pub use jwt::{JwtService, DEFAULT_TOKEN_TTL_MINUTES};
pub use service::{AuthService, LoginResult};
pub use signing_key::{SigningKey, MIN_SECRET_BYTES};
