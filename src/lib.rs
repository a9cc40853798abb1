//! HiringGo User Service
//!
//! Authentication core for the HiringGo platform:
//! - JWT issuance and verification (HMAC secret or JWKS)
//! - Credential validation against the user store
//! - Role-based access guards for `admin`, `dosen` and `mahasiswa`
//! - User management over in-memory or PostgreSQL storage

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use crate::config::AppConfig;

use std::sync::Arc;

use chrono::Duration;
use rand::Rng;
use tracing::info;

use crate::api::state::{AppState, UserServiceTrait};
use crate::config::{AuthConfig, StorageBackend, MAX_TOKEN_TTL_MINUTES};
use crate::domain::{DomainError, Role, UserRepository};
use crate::infrastructure::{
    auth::{AuthService, CredentialValidator, JwtService, SigningKey},
    storage::{connect, run_user_migrations, PostgresConfig},
    user::{
        Argon2Hasher, CreateUserRequest, InMemoryUserRepository, PasswordHasher,
        PostgresUserRepository, UserService,
    },
};

const BOOTSTRAP_ADMIN_NAME: &str = "Administrator";
const GENERATED_PASSWORD_LENGTH: usize = 16;

/// Create the application state with all services initialized
pub async fn create_app_state(config: &AppConfig) -> anyhow::Result<AppState> {
    let jwt = Arc::new(build_jwt_service(&config.auth)?);
    let repository = create_user_repository(config).await?;
    let hasher: Arc<dyn PasswordHasher> = Arc::new(Argon2Hasher::new());

    let auth_service = AuthService::new(
        CredentialValidator::new(repository.clone(), hasher.clone()),
        jwt.clone(),
        jwt,
    );
    let user_service = Arc::new(UserService::new(repository, hasher));

    let admin_password = std::env::var("ADMIN_DEFAULT_PASSWORD")
        .ok()
        .filter(|p| !p.is_empty());
    ensure_bootstrap_admin(
        user_service.as_ref(),
        &config.auth.bootstrap_admin_email,
        admin_password,
    )
    .await?;

    Ok(AppState::new(Arc::new(auth_service), user_service))
}

/// JWT service over the configured signing key and token lifetime
pub fn build_jwt_service(config: &AuthConfig) -> Result<JwtService, DomainError> {
    let ttl = token_ttl(config.token_ttl_minutes)?;
    let key = build_signing_key(config)?;

    Ok(JwtService::new(Arc::new(key), ttl))
}

/// Token lifetime in minutes, rejecting values outside `1..=MAX_TOKEN_TTL_MINUTES`
pub fn token_ttl(minutes: i64) -> Result<Duration, DomainError> {
    if !(1..=MAX_TOKEN_TTL_MINUTES).contains(&minutes) {
        return Err(DomainError::configuration(format!(
            "Token TTL must be between 1 and {} minutes, got {}",
            MAX_TOKEN_TTL_MINUTES, minutes
        )));
    }

    Duration::try_minutes(minutes)
        .ok_or_else(|| DomainError::configuration("Token TTL is out of range"))
}

/// Signing key from the JWKS, then the shared secret, else a random secret
pub fn build_signing_key(config: &AuthConfig) -> Result<SigningKey, DomainError> {
    if let Some(jwks) = config.jwks.as_deref() {
        let key = SigningKey::from_jwks_json(jwks)?;
        info!(
            algorithm = ?key.algorithm(),
            kid = key.key_id().unwrap_or("-"),
            "Using JWKS signing key"
        );
        return Ok(key);
    }

    if let Some(secret) = config.jwt_secret.as_deref() {
        return SigningKey::from_secret(secret);
    }

    tracing::warn!(
        "No USERS_JWKS or JWT_SECRET configured. Generating random secret. \
        Tokens will NOT survive a restart."
    );
    Ok(SigningKey::generate())
}

async fn create_user_repository(config: &AppConfig) -> anyhow::Result<Arc<dyn UserRepository>> {
    match config.storage.backend {
        StorageBackend::Memory => {
            info!("Using in-memory user store");
            Ok(Arc::new(InMemoryUserRepository::new()))
        }
        StorageBackend::Postgres => {
            let url = config
                .storage
                .database_url
                .clone()
                .ok_or_else(|| DomainError::configuration("storage.database_url is not set"))?;

            let pool = connect(
                &PostgresConfig::new(url)
                    .with_max_connections(config.storage.max_connections)
                    .with_connect_timeout(config.storage.connect_timeout_seconds),
            )
            .await?;
            run_user_migrations(&pool).await?;

            info!("Using PostgreSQL user store");
            Ok(Arc::new(PostgresUserRepository::new(pool)))
        }
    }
}

fn generate_random_password() -> String {
    use rand::distributions::Alphanumeric;

    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(GENERATED_PASSWORD_LENGTH)
        .map(char::from)
        .collect()
}

/// Create an initial admin when the store is empty. Returns whether one was
/// created.
pub async fn ensure_bootstrap_admin(
    user_service: &dyn UserServiceTrait,
    email: &str,
    password: Option<String>,
) -> anyhow::Result<bool> {
    if user_service.count().await? > 0 {
        return Ok(false);
    }

    let (password, is_default) = match password {
        Some(p) => (p, true),
        None => (generate_random_password(), false),
    };

    let admin = user_service
        .create(CreateUserRequest {
            email: email.to_string(),
            name: BOOTSTRAP_ADMIN_NAME.to_string(),
            password: password.clone(),
            role: Role::Admin.as_str().to_string(),
            nip: None,
            nim: None,
        })
        .await?;

    info!("===========================================");
    info!("Initial admin user created!");
    info!("User ID: {}", admin.id());
    info!("Email: {}", admin.email());

    if is_default {
        info!("Password: (set via ADMIN_DEFAULT_PASSWORD)");
    } else {
        info!("Password: {}", password);
    }

    info!("Please change this password after first login.");
    info!("===========================================");

    Ok(true)
}
