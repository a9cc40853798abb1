//! Verified identities and token claims

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::user::RoleSet;

/// Who a request acts as, and with which roles
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    user_id: String,
    email: String,
    roles: RoleSet,
}

impl Identity {
    pub fn new(user_id: impl Into<String>, email: impl Into<String>, roles: RoleSet) -> Self {
        Self {
            user_id: user_id.into(),
            email: email.into(),
            roles,
        }
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn roles(&self) -> &RoleSet {
        &self.roles
    }
}

/// JWT claims carried by every issued token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject (user ID)
    pub sub: String,
    pub email: String,
    pub roles: RoleSet,
    /// Issued at (Unix seconds)
    pub iat: i64,
    /// Expiration (Unix seconds)
    pub exp: i64,
    /// Unique token id
    pub jti: String,
}

impl TokenClaims {
    /// Build claims for an identity, valid for `ttl` from `now`
    pub fn new(identity: &Identity, now: DateTime<Utc>, ttl: chrono::Duration) -> Self {
        let iat = now.timestamp();

        Self {
            sub: identity.user_id.clone(),
            email: identity.email.clone(),
            roles: identity.roles.clone(),
            iat,
            exp: iat + ttl.num_seconds(),
            jti: uuid::Uuid::new_v4().to_string(),
        }
    }

    /// A token is live only while `exp` is strictly in the future
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.exp <= now.timestamp()
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        Utc.timestamp_opt(self.exp, 0)
            .single()
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }

    pub fn identity(&self) -> Identity {
        Identity::new(&self.sub, &self.email, self.roles.clone())
    }
}

/// Result of a successful issuance
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub claims: TokenClaims,
}

impl IssuedToken {
    pub fn expires_at(&self) -> DateTime<Utc> {
        self.claims.expires_at()
    }
}
