//! Token issuance and verification seams

use std::fmt::Debug;

use chrono::{DateTime, Utc};

use super::error::AuthError;
use super::identity::{Identity, IssuedToken};

/// Issues signed, time-limited tokens for validated identities
pub trait TokenIssuer: Send + Sync + Debug {
    /// Issue a token whose lifetime starts at `now`
    fn issue_at(&self, identity: &Identity, now: DateTime<Utc>) -> Result<IssuedToken, AuthError>;

    /// Issue a token starting at the current instant
    fn issue(&self, identity: &Identity) -> Result<IssuedToken, AuthError> {
        self.issue_at(identity, Utc::now())
    }

    /// Configured lifetime of issued tokens
    fn ttl(&self) -> chrono::Duration;
}

/// Checks a token's signature and expiry and recovers the identity it carries
pub trait TokenVerifier: Send + Sync + Debug {
    /// Verify a token as of `now`
    fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<Identity, AuthError>;

    fn verify(&self, token: &str) -> Result<Identity, AuthError> {
        self.verify_at(token, Utc::now())
    }
}
