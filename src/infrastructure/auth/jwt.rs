//! JWT token issuance and verification

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Header, Validation};
use std::fmt::Debug;
use std::sync::Arc;

use super::signing_key::SigningKey;
use crate::domain::auth::{AuthError, Identity, IssuedToken, TokenClaims, TokenIssuer, TokenVerifier};

/// Default token lifetime
pub const DEFAULT_TOKEN_TTL_MINUTES: i64 = 60;

/// Stateless JWT service backed by a single signing key.
///
/// Tokens are self-contained; verification never consults the user store.
#[derive(Clone)]
pub struct JwtService {
    key: Arc<SigningKey>,
    ttl: Duration,
}

impl Debug for JwtService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtService")
            .field("key", &self.key)
            .field("ttl_seconds", &self.ttl.num_seconds())
            .finish()
    }
}

impl JwtService {
    pub fn new(key: Arc<SigningKey>, ttl: Duration) -> Self {
        Self { key, ttl }
    }

    /// Same key, different token lifetime
    pub fn with_ttl(self, ttl: Duration) -> Self {
        Self { ttl, ..self }
    }

    fn validation(&self) -> Validation {
        let mut validation = Validation::new(self.key.algorithm());
        // Expiry is checked against the caller's clock with no leeway
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);
        validation
    }
}

impl TokenIssuer for JwtService {
    fn issue_at(&self, identity: &Identity, now: DateTime<Utc>) -> Result<IssuedToken, AuthError> {
        let encoding_key = self
            .key
            .encoding_key()
            .ok_or_else(|| AuthError::signing("Signing key has no private material"))?;

        let claims = TokenClaims::new(identity, now, self.ttl);

        let mut header = Header::new(self.key.algorithm());
        header.kid = self.key.key_id().map(String::from);

        let token = encode(&header, &claims, encoding_key)
            .map_err(|e| AuthError::signing(e.to_string()))?;

        Ok(IssuedToken { token, claims })
    }

    fn ttl(&self) -> Duration {
        self.ttl
    }
}

impl TokenVerifier for JwtService {
    fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<Identity, AuthError> {
        if token.trim().is_empty() {
            return Err(AuthError::invalid_token("Token is empty"));
        }

        // Signature and structure first, so a forged expired token is invalid, not expired
        let data = decode::<TokenClaims>(token, self.key.decoding_key(), &self.validation())
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::ExpiredToken,
                _ => AuthError::invalid_token(e.to_string()),
            })?;

        if data.claims.is_expired_at(now) {
            return Err(AuthError::ExpiredToken);
        }

        Ok(data.claims.identity())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::user::{Role, RoleSet};
    use super::super::signing_key::test_keys;
    use jsonwebtoken::{Algorithm, EncodingKey};

    const SECRET: &str = "test-secret-key-for-hs256-signing-0123456789";

    fn create_service() -> JwtService {
        let key = SigningKey::from_secret(SECRET).unwrap();
        JwtService::new(Arc::new(key), Duration::minutes(60))
    }

    fn alice() -> Identity {
        Identity::new("alice", "alice@hiringgo.id", RoleSet::single(Role::Admin))
    }

    #[test]
    fn test_issue_and_verify() {
        let service = create_service();

        let issued = service.issue(&alice()).unwrap();
        let identity = service.verify(&issued.token).unwrap();

        assert_eq!(identity, alice());
        assert_eq!(identity.user_id(), "alice");
        assert!(identity.roles().contains(Role::Admin));
    }

    #[test]
    fn test_issued_claims_window() {
        let service = create_service();
        let now = Utc::now();

        let issued = service.issue_at(&alice(), now).unwrap();

        assert_eq!(issued.claims.iat, now.timestamp());
        assert_eq!(issued.claims.exp, now.timestamp() + 3600);
        assert_eq!(service.ttl(), Duration::minutes(60));
    }

    #[test]
    fn test_each_token_has_unique_id() {
        let service = create_service();
        let now = Utc::now();

        let first = service.issue_at(&alice(), now).unwrap();
        let second = service.issue_at(&alice(), now).unwrap();

        assert_ne!(first.claims.jti, second.claims.jti);
        assert_ne!(first.token, second.token);
    }

    #[test]
    fn test_not_a_token() {
        let service = create_service();

        let result = service.verify("not-a-token");
        assert!(matches!(result, Err(AuthError::InvalidToken { .. })));
    }

    #[test]
    fn test_empty_token() {
        let service = create_service();

        assert!(matches!(service.verify(""), Err(AuthError::InvalidToken { .. })));
        assert!(matches!(service.verify("   "), Err(AuthError::InvalidToken { .. })));
    }

    #[test]
    fn test_token_from_other_key_is_invalid() {
        let service = create_service();
        let other = JwtService::new(
            Arc::new(SigningKey::from_secret("a-completely-different-secret-value-9876").unwrap()),
            Duration::minutes(60),
        );

        let issued = other.issue(&alice()).unwrap();
        let result = service.verify(&issued.token);

        assert!(matches!(result, Err(AuthError::InvalidToken { .. })));
    }

    #[test]
    fn test_tampered_payload_is_invalid() {
        let service = create_service();
        let issued = service.issue(&alice()).unwrap();

        let mut parts: Vec<&str> = issued.token.split('.').collect();
        let forged_claims = serde_json::json!({
            "sub": "mallory",
            "email": "mallory@evil.id",
            "roles": ["admin"],
            "iat": issued.claims.iat,
            "exp": issued.claims.exp,
            "jti": "forged",
        });
        let forged_payload = base64::Engine::encode(
            &base64::engine::general_purpose::URL_SAFE_NO_PAD,
            forged_claims.to_string(),
        );
        parts[1] = &forged_payload;

        let result = service.verify(&parts.join("."));
        assert!(matches!(result, Err(AuthError::InvalidToken { .. })));
    }

    #[test]
    fn test_token_expires_after_ttl() {
        let service = create_service();
        let now = Utc::now();
        let issued = service.issue_at(&alice(), now).unwrap();

        assert!(service.verify_at(&issued.token, now).is_ok());
        assert!(service
            .verify_at(&issued.token, now + Duration::minutes(60) - Duration::seconds(1))
            .is_ok());

        let at_expiry = service.verify_at(&issued.token, now + Duration::minutes(60));
        assert!(matches!(at_expiry, Err(AuthError::ExpiredToken)));

        let later = service.verify_at(&issued.token, now + Duration::hours(5));
        assert!(matches!(later, Err(AuthError::ExpiredToken)));
    }

    #[test]
    fn test_expired_token_with_bad_signature_is_invalid() {
        let service = create_service();
        let other = JwtService::new(
            Arc::new(SigningKey::from_secret("a-completely-different-secret-value-9876").unwrap()),
            Duration::minutes(1),
        );
        let now = Utc::now();
        let issued = other.issue_at(&alice(), now - Duration::hours(2)).unwrap();

        let result = service.verify_at(&issued.token, now);
        assert!(matches!(result, Err(AuthError::InvalidToken { .. })));
    }

    #[test]
    fn test_unknown_role_is_invalid() {
        let service = create_service();
        let now = Utc::now().timestamp();
        let claims = serde_json::json!({
            "sub": "eve",
            "email": "eve@hiringgo.id",
            "roles": ["superuser"],
            "iat": now,
            "exp": now + 600,
            "jti": "x",
        });

        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();

        let result = service.verify(&token);
        assert!(matches!(result, Err(AuthError::InvalidToken { .. })));
    }

    #[test]
    fn test_missing_roles_claim_is_invalid() {
        let service = create_service();
        let now = Utc::now().timestamp();
        let claims = serde_json::json!({
            "sub": "eve",
            "email": "eve@hiringgo.id",
            "iat": now,
            "exp": now + 600,
            "jti": "x",
        });

        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();

        assert!(matches!(
            service.verify(&token),
            Err(AuthError::InvalidToken { .. })
        ));
    }

    #[test]
    fn test_algorithm_mismatch_is_invalid() {
        let service = create_service();
        let now = Utc::now().timestamp();
        let claims = serde_json::json!({
            "sub": "alice",
            "email": "alice@hiringgo.id",
            "roles": ["admin"],
            "iat": now,
            "exp": now + 600,
            "jti": "x",
        });

        let token = encode(
            &Header::new(Algorithm::HS512),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();

        assert!(matches!(
            service.verify(&token),
            Err(AuthError::InvalidToken { .. })
        ));
    }

    #[test]
    fn test_verify_only_key_cannot_issue() {
        let key = SigningKey::from_jwks_json(&test_keys::rsa_jwks(false)).unwrap();
        let service = JwtService::new(Arc::new(key), Duration::minutes(60));

        let result = service.issue(&alice());
        assert!(matches!(result, Err(AuthError::Signing { .. })));
    }

    #[test]
    fn test_rs256_round_trip() {
        let signer = JwtService::new(
            Arc::new(SigningKey::from_jwks_json(&test_keys::rsa_jwks(true)).unwrap()),
            Duration::minutes(15),
        );
        let verifier = JwtService::new(
            Arc::new(SigningKey::from_jwks_json(&test_keys::rsa_jwks(false)).unwrap()),
            Duration::minutes(15),
        );

        let issued = signer.issue(&alice()).unwrap();
        let header = jsonwebtoken::decode_header(&issued.token).unwrap();
        assert_eq!(header.alg, Algorithm::RS256);
        assert_eq!(header.kid.as_deref(), Some("rsa-test"));

        let identity = verifier.verify(&issued.token).unwrap();
        assert_eq!(identity, alice());
    }

    #[test]
    fn test_concurrent_verification() {
        let service = create_service();
        let issued = service.issue(&alice()).unwrap();

        std::thread::scope(|scope| {
            for _ in 0..8 {
                scope.spawn(|| {
                    for _ in 0..25 {
                        assert_eq!(service.verify(&issued.token).unwrap(), alice());
                    }
                });
            }
        });
    }
}
