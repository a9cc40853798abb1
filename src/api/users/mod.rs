//! User management endpoints (admin only)

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, patch, post},
    Router,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::api::auth::MessageResponse;
use crate::api::middleware::{AdminOnly, RequireRole};
use crate::api::state::AppState;
use crate::api::types::{ApiError, Json, UserResponse};
use crate::domain::DomainError;
use crate::infrastructure::user::CreateUserRequest;

pub fn create_user_router() -> Router<AppState> {
    Router::new()
        .route("/create", post(create_user))
        .route("/list", get(list_users))
        .route("/update-role/{user_id}", patch(update_role))
        .route("/suspend/{user_id}", patch(suspend_user))
        .route("/activate/{user_id}", patch(activate_user))
        .route("/delete/{user_id}", delete(delete_user))
        .route("/{user_id}", get(get_user))
}

#[derive(Deserialize)]
pub struct CreateUserApiRequest {
    pub email: String,
    pub name: String,
    pub password: String,
    pub role: String,
    #[serde(default)]
    pub nip: Option<String>,
    #[serde(default)]
    pub nim: Option<String>,
}

impl std::fmt::Debug for CreateUserApiRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CreateUserApiRequest")
            .field("email", &self.email)
            .field("name", &self.name)
            .field("role", &self.role)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateRoleRequest {
    pub role: String,
}

#[derive(Debug, Serialize)]
pub struct UserEnvelope {
    pub user: UserResponse,
}

#[derive(Debug, Serialize)]
pub struct ListUsersResponse {
    pub users: Vec<UserResponse>,
    pub total: usize,
}

/// POST /user/create
pub async fn create_user(
    State(state): State<AppState>,
    admin: RequireRole<AdminOnly>,
    Json(request): Json<CreateUserApiRequest>,
) -> Result<(StatusCode, Json<UserEnvelope>), ApiError> {
    debug!(admin = admin.identity().user_id(), email = %request.email, role = %request.role, "Admin creating user");

    let user = state
        .user_service
        .create(CreateUserRequest {
            email: request.email,
            name: request.name,
            password: request.password,
            role: request.role,
            nip: request.nip,
            nim: request.nim,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(UserEnvelope {
            user: UserResponse::from(&user),
        }),
    ))
}

/// GET /user/list
pub async fn list_users(
    State(state): State<AppState>,
    _admin: RequireRole<AdminOnly>,
) -> Result<Json<ListUsersResponse>, ApiError> {
    let users: Vec<UserResponse> = state
        .user_service
        .list()
        .await?
        .iter()
        .map(UserResponse::from)
        .collect();
    let total = users.len();

    Ok(Json(ListUsersResponse { users, total }))
}

/// GET /user/{user_id}
pub async fn get_user(
    State(state): State<AppState>,
    _admin: RequireRole<AdminOnly>,
    Path(user_id): Path<String>,
) -> Result<Json<UserEnvelope>, ApiError> {
    let user = state
        .user_service
        .get(&user_id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("User '{}' not found", user_id)))?;

    Ok(Json(UserEnvelope {
        user: UserResponse::from(&user),
    }))
}

/// PATCH /user/update-role/{user_id}
pub async fn update_role(
    State(state): State<AppState>,
    admin: RequireRole<AdminOnly>,
    Path(user_id): Path<String>,
    Json(request): Json<UpdateRoleRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    debug!(admin = admin.identity().user_id(), user_id = %user_id, role = %request.role, "Admin updating role");

    let user = state
        .user_service
        .update_role(&user_id, &request.role)
        .await
        .map_err(|err| match err {
            DomainError::Validation { .. } => ApiError::from(err).with_param("role"),
            other => other.into(),
        })?;

    Ok(Json(MessageResponse {
        message: format!("Role of user {} updated to {}", user.id(), user.role()),
    }))
}

/// PATCH /user/suspend/{user_id}
pub async fn suspend_user(
    State(state): State<AppState>,
    admin: RequireRole<AdminOnly>,
    Path(user_id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    debug!(admin = admin.identity().user_id(), user_id = %user_id, "Admin suspending user");

    let user = state.user_service.suspend(&user_id).await?;

    Ok(Json(MessageResponse {
        message: format!("User {} suspended", user.id()),
    }))
}

/// PATCH /user/activate/{user_id}
pub async fn activate_user(
    State(state): State<AppState>,
    admin: RequireRole<AdminOnly>,
    Path(user_id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    debug!(admin = admin.identity().user_id(), user_id = %user_id, "Admin activating user");

    let user = state.user_service.activate(&user_id).await?;

    Ok(Json(MessageResponse {
        message: format!("User {} activated", user.id()),
    }))
}

/// DELETE /user/delete/{user_id}
pub async fn delete_user(
    State(state): State<AppState>,
    admin: RequireRole<AdminOnly>,
    Path(user_id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    debug!(admin = admin.identity().user_id(), user_id = %user_id, "Admin deleting user");

    if !state.user_service.delete(&user_id).await? {
        return Err(ApiError::not_found(format!("User '{}' not found", user_id)));
    }

    Ok(Json(MessageResponse {
        message: format!("User {} deleted", user_id),
    }))
}
