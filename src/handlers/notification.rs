use axum::{
    extract::{
        rejection::{PathRejection, QueryRejection},
        Path, Query, State,
    },
    Json,
};

use crate::auth::AuthUser;
use crate::error::AppError;
use crate::handlers::{path_param, query_params};
use crate::models::notification::{
    MarkAllReadResponse, NotificationListResponse, NotificationResponse, NotificationsQuery,
};
use crate::services::notification;
use crate::AppState;

/// GET /api/notifications?unread=true&limit=50
pub async fn list_notifications(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    query: Result<Query<NotificationsQuery>, QueryRejection>,
) -> Result<Json<NotificationListResponse>, AppError> {
    let query = query_params(query)?;
    let rows = notification::list(
        &state.db,
        user.id,
        query.unread.unwrap_or(false),
        query.limit,
    )
    .await?;
    let unread_count = notification::unread_count(&state.db, user.id).await?;

    Ok(Json(NotificationListResponse {
        notifications: rows.into_iter().map(NotificationResponse::from).collect(),
        unread_count,
    }))
}

/// POST /api/notifications/{id}/read
pub async fn mark_read(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    id: Result<Path<i32>, PathRejection>,
) -> Result<Json<NotificationResponse>, AppError> {
    let id = path_param(id)?;
    let updated = notification::mark_read(&state.db, user.id, id).await?;
    Ok(Json(updated.into()))
}

/// POST /api/notifications/read-all
pub async fn mark_all_read(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<MarkAllReadResponse>, AppError> {
    let updated = notification::mark_all_read(&state.db, user.id).await?;
    Ok(Json(MarkAllReadResponse {
        success: true,
        updated,
    }))
}
