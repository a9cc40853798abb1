//! Process-wide token signing key material

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey};
use rand::Rng;
use rsa::pkcs1::{EncodeRsaPrivateKey, LineEnding};
use rsa::{BigUint, RsaPrivateKey};
use serde::Deserialize;
use std::fmt::Debug;

use crate::domain::DomainError;

/// Minimum HMAC secret length (256 bits)
pub const MIN_SECRET_BYTES: usize = 32;

const GENERATED_SECRET_LENGTH: usize = 64;

/// Key material used to sign and verify tokens.
///
/// Loaded once at startup and shared read-only. A key built from a public
/// RSA JWK can verify but not sign.
#[derive(Clone)]
pub struct SigningKey {
    algorithm: Algorithm,
    encoding_key: Option<EncodingKey>,
    decoding_key: DecodingKey,
    key_id: Option<String>,
}

impl Debug for SigningKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SigningKey")
            .field("algorithm", &self.algorithm)
            .field("key_id", &self.key_id)
            .field("can_sign", &self.can_sign())
            .field("material", &"[hidden]")
            .finish()
    }
}

impl SigningKey {
    /// HS256 key from a shared secret
    pub fn from_secret(secret: impl AsRef<[u8]>) -> Result<Self, DomainError> {
        Self::from_secret_with_algorithm(secret.as_ref(), Algorithm::HS256, None)
    }

    /// HS256 key from a freshly generated random secret
    pub fn generate() -> Self {
        let secret: String = rand::thread_rng()
            .sample_iter(&rand::distributions::Alphanumeric)
            .take(GENERATED_SECRET_LENGTH)
            .map(char::from)
            .collect();

        Self {
            algorithm: Algorithm::HS256,
            encoding_key: Some(EncodingKey::from_secret(secret.as_bytes())),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            key_id: None,
        }
    }

    /// Key from a JWKS document. The first key with a `kid` wins, otherwise
    /// the first key. Supports `oct` (HS*) and `RSA` (RS*) keys.
    pub fn from_jwks_json(jwks_json: &str) -> Result<Self, DomainError> {
        let jwks: Jwks = serde_json::from_str(jwks_json)
            .map_err(|e| DomainError::configuration(format!("Failed to parse JWKS: {}", e)))?;

        let key = jwks
            .keys
            .iter()
            .find(|k| k.kid.is_some())
            .or_else(|| jwks.keys.first())
            .ok_or_else(|| DomainError::configuration("JWKS contains no keys"))?;

        match key.kty.as_str() {
            "oct" => Self::from_oct_jwk(key),
            "RSA" => Self::from_rsa_jwk(key),
            other => Err(DomainError::configuration(format!(
                "Unsupported key type: {}. Use RSA or oct.",
                other
            ))),
        }
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    pub fn key_id(&self) -> Option<&str> {
        self.key_id.as_deref()
    }

    /// Whether private material is present
    pub fn can_sign(&self) -> bool {
        self.encoding_key.is_some()
    }

    pub(crate) fn encoding_key(&self) -> Option<&EncodingKey> {
        self.encoding_key.as_ref()
    }

    pub(crate) fn decoding_key(&self) -> &DecodingKey {
        &self.decoding_key
    }

    fn from_secret_with_algorithm(
        secret: &[u8],
        algorithm: Algorithm,
        key_id: Option<String>,
    ) -> Result<Self, DomainError> {
        if secret.len() < MIN_SECRET_BYTES {
            return Err(DomainError::configuration(format!(
                "JWT secret must be at least {} bytes, got {}",
                MIN_SECRET_BYTES,
                secret.len()
            )));
        }

        Ok(Self {
            algorithm,
            encoding_key: Some(EncodingKey::from_secret(secret)),
            decoding_key: DecodingKey::from_secret(secret),
            key_id,
        })
    }

    fn from_oct_jwk(key: &JwkKey) -> Result<Self, DomainError> {
        let algorithm = match key.alg.as_deref() {
            Some("HS256") | None => Algorithm::HS256,
            Some("HS384") => Algorithm::HS384,
            Some("HS512") => Algorithm::HS512,
            Some(alg) => {
                return Err(DomainError::configuration(format!(
                    "Unsupported symmetric algorithm: {}",
                    alg
                )))
            }
        };

        let k = key
            .k
            .as_deref()
            .ok_or_else(|| DomainError::configuration("Symmetric key missing 'k' value"))?;
        let secret = decode_base64url(k, "k")?;

        Self::from_secret_with_algorithm(&secret, algorithm, key.kid.clone())
    }

    fn from_rsa_jwk(key: &JwkKey) -> Result<Self, DomainError> {
        let algorithm = match key.alg.as_deref() {
            Some("RS256") | None => Algorithm::RS256,
            Some("RS384") => Algorithm::RS384,
            Some("RS512") => Algorithm::RS512,
            Some(alg) => {
                return Err(DomainError::configuration(format!(
                    "Unsupported RSA algorithm: {}",
                    alg
                )))
            }
        };

        let n = key
            .n
            .as_deref()
            .ok_or_else(|| DomainError::configuration("RSA key missing 'n' (modulus)"))?;
        let e = key
            .e
            .as_deref()
            .ok_or_else(|| DomainError::configuration("RSA key missing 'e' (public exponent)"))?;

        let decoding_key = DecodingKey::from_rsa_components(n, e)
            .map_err(|e| DomainError::configuration(format!("Invalid RSA public key: {}", e)))?;

        let encoding_key = match key.d.as_deref() {
            Some(d) => Some(rsa_encoding_key(n, e, d, key.p.as_deref(), key.q.as_deref())?),
            None => None,
        };

        Ok(Self {
            algorithm,
            encoding_key,
            decoding_key,
            key_id: key.kid.clone(),
        })
    }
}

/// JWK fields needed for `oct` and `RSA` keys
#[derive(Debug, Clone, Deserialize)]
struct JwkKey {
    kty: String,
    kid: Option<String>,
    alg: Option<String>,
    n: Option<String>,
    e: Option<String>,
    d: Option<String>,
    p: Option<String>,
    q: Option<String>,
    k: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct Jwks {
    keys: Vec<JwkKey>,
}

fn rsa_encoding_key(
    n: &str,
    e: &str,
    d: &str,
    p: Option<&str>,
    q: Option<&str>,
) -> Result<EncodingKey, DomainError> {
    let to_uint = |value: &str, field: &str| -> Result<BigUint, DomainError> {
        decode_base64url(value, field).map(|bytes| BigUint::from_bytes_be(&bytes))
    };

    // Without p and q the rsa crate recovers the primes from n, e, d
    let primes = match (p, q) {
        (Some(p), Some(q)) => vec![to_uint(p, "p")?, to_uint(q, "q")?],
        _ => Vec::new(),
    };

    let private_key =
        RsaPrivateKey::from_components(to_uint(n, "n")?, to_uint(e, "e")?, to_uint(d, "d")?, primes)
            .map_err(|e| DomainError::configuration(format!("Invalid RSA key components: {}", e)))?;

    let pem = private_key
        .to_pkcs1_pem(LineEnding::LF)
        .map_err(|e| DomainError::configuration(format!("Failed to encode RSA private key: {}", e)))?;

    EncodingKey::from_rsa_pem(pem.as_bytes())
        .map_err(|e| DomainError::configuration(format!("Failed to create encoding key: {}", e)))
}

fn decode_base64url(value: &str, field: &str) -> Result<Vec<u8>, DomainError> {
    URL_SAFE_NO_PAD.decode(value).map_err(|e| {
        DomainError::configuration(format!("Invalid base64url in JWK '{}': {}", field, e))
    })
}
