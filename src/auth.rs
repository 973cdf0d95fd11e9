//! Request identity
//!
//! Sessions live outside this service. The fronting session layer forwards
//! the authenticated user id in `x-user-id`; browsers opening the realtime
//! socket pass it as the `userId` query parameter instead.

use axum::{
    extract::{FromRequestParts, Query},
    http::{request::Parts, HeaderMap},
};
use sea_orm::EntityTrait;
use serde::Deserialize;
use tracing::{error, warn};

use crate::entities::users;
use crate::error::AppError;
use crate::AppState;

pub const USER_ID_HEADER: &str = "x-user-id";
pub const API_KEY_HEADER: &str = "x-api-key";

/// The calling user, loaded from the database
#[derive(Debug, Clone)]
pub struct AuthUser(pub users::Model);

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IdentityQuery {
    user_id: Option<String>,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let raw = header_user_id(&parts.headers).or_else(|| {
            Query::<IdentityQuery>::try_from_uri(&parts.uri)
                .ok()
                .and_then(|Query(q)| q.user_id)
        });

        let user_id = raw
            .as_deref()
            .map(str::trim)
            .and_then(|s| s.parse::<i32>().ok())
            .filter(|id| *id > 0)
            .ok_or_else(|| AppError::Unauthorized("Authentication required".to_string()))?;

        let user = users::Entity::find_by_id(user_id)
            .one(&state.db)
            .await?
            .ok_or_else(|| {
                warn!(user_id, "Request for unknown user");
                AppError::Unauthorized("Unknown user".to_string())
            })?;

        Ok(AuthUser(user))
    }
}

fn header_user_id(headers: &HeaderMap) -> Option<String> {
    headers
        .get(USER_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

/// Guard for `/api/admin/*`: `x-api-key` must equal `ADMIN_API_KEY`
#[derive(Debug, Clone, Copy)]
pub struct AdminAuth;

impl FromRequestParts<AppState> for AdminAuth {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let admin_key = state.config.admin_api_key.as_deref().ok_or_else(|| {
            error!("ADMIN_API_KEY not configured");
            AppError::Config("Server configuration error".to_string())
        })?;

        let provided_key = parts
            .headers
            .get(API_KEY_HEADER)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("");

        if provided_key != admin_key {
            warn!("Invalid or missing API key");
            return Err(AppError::Unauthorized(
                "Invalid or missing API key".to_string(),
            ));
        }

        Ok(AdminAuth)
    }
}
