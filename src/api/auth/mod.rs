//! Authentication API endpoints
//!
//! Login issues a bearer token; `me` and `logout` only need a valid one.
//! Tokens are stateless, so logout is acknowledged and the client discards
//! its token.

use axum::{
    extract::State,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};

use crate::api::middleware::RequireIdentity;
use crate::api::state::AppState;
use crate::api::types::{ApiError, Json, UserResponse};
use crate::domain::Identity;

pub fn create_auth_router() -> Router<AppState> {
    Router::new()
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/me", get(me))
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginRequest")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub token_type: &'static str,
    pub expires_at: String,
    pub user: UserResponse,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// POST /auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let login = state
        .auth_service
        .login(&request.email, &request.password)
        .await?;

    Ok(Json(LoginResponse {
        expires_at: login.issued.expires_at().to_rfc3339(),
        token: login.issued.token,
        token_type: "Bearer",
        user: UserResponse::from(&login.user),
    }))
}

/// POST /auth/logout
pub async fn logout(RequireIdentity(identity): RequireIdentity) -> Json<MessageResponse> {
    tracing::info!(user_id = identity.user_id(), "User logged out");

    Json(MessageResponse {
        message: "Logged out successfully".to_string(),
    })
}

/// GET /auth/me
pub async fn me(RequireIdentity(identity): RequireIdentity) -> Json<Identity> {
    Json(identity)
}
