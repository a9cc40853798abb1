//! Authentication domain
//!
//! Identities, token claims, the token issuer/verifier seams, the access
//! guard, and the error taxonomy they share.

mod error;
mod guard;
mod identity;
mod token;

pub use error::AuthError;
pub use guard::{authorize, RoleGuard};
pub use identity::{Identity, IssuedToken, TokenClaims};
pub use token::{TokenIssuer, TokenVerifier};
