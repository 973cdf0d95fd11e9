use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    Json,
};

use crate::auth::AdminAuth;
use crate::error::AppError;
use crate::handlers::{json_body, path_param};
use crate::models::notification::NotificationResponse;
use crate::models::user::{
    AccessUpdateRequest, CreateUserRequest, SystemMessageRequest, UserListResponse, UserResponse,
};
use crate::services::users;
use crate::AppState;

/// GET /api/admin/users
pub async fn list_users(
    State(state): State<AppState>,
    _admin: AdminAuth,
) -> Result<Json<UserListResponse>, AppError> {
    let users = users::list_users(&state.db)
        .await?
        .into_iter()
        .map(UserResponse::from)
        .collect();
    Ok(Json(UserListResponse { users }))
}

/// POST /api/admin/users
///
/// Registration front-ends call this once they have hashed the password.
pub async fn create_user(
    State(state): State<AppState>,
    _admin: AdminAuth,
    payload: Result<Json<CreateUserRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<UserResponse>), AppError> {
    let request = json_body(payload)?;
    let user = users::create_user(&state.db, request.into()).await?;
    Ok((StatusCode::CREATED, Json(user.into())))
}

/// PATCH /api/admin/users/{id}/access
pub async fn update_access(
    State(state): State<AppState>,
    _admin: AdminAuth,
    id: Result<Path<i32>, PathRejection>,
    payload: Result<Json<AccessUpdateRequest>, JsonRejection>,
) -> Result<Json<UserResponse>, AppError> {
    let id = path_param(id)?;
    let request = json_body(payload)?;
    let user = users::set_access(&state.db, id, &request).await?;
    Ok(Json(user.into()))
}

/// POST /api/admin/users/{id}/message
pub async fn send_message(
    State(state): State<AppState>,
    _admin: AdminAuth,
    id: Result<Path<i32>, PathRejection>,
    payload: Result<Json<SystemMessageRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<NotificationResponse>), AppError> {
    let id = path_param(id)?;
    let request = json_body(payload)?;
    let stored =
        users::send_system_message(&state.db, &state.registry, id, &request.title, &request.message)
            .await?;
    Ok((StatusCode::CREATED, Json(stored.into())))
}
