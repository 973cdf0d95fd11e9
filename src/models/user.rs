use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::entities::users;
use crate::models::balance::BalanceResponse;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: i32,
    pub uid: String,
    pub username: String,
    pub email: String,
    pub is_verified: bool,
    pub is_admin: bool,
    pub transfer_access: bool,
    pub withdrawal_access: bool,
    pub balance: Decimal,
    pub created_at: String,
}

impl From<users::Model> for UserResponse {
    fn from(model: users::Model) -> Self {
        Self {
            transfer_access: model.can_transfer(),
            withdrawal_access: model.can_withdraw(),
            id: model.id,
            uid: model.uid,
            username: model.username,
            email: model.email,
            is_verified: model.is_verified,
            is_admin: model.is_admin,
            balance: model.balance,
            created_at: model.created_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeResponse {
    pub user: UserResponse,
    pub balances: Vec<BalanceResponse>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserListResponse {
    pub users: Vec<UserResponse>,
}

/// Admin toggle; absent fields are left unchanged
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessUpdateRequest {
    pub transfer_access: Option<bool>,
    pub withdrawal_access: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemMessageRequest {
    pub title: String,
    pub message: String,
}

/// Body of `POST /api/admin/users`; the password arrives already hashed
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    #[serde(default)]
    pub is_admin: Option<bool>,
}

impl From<CreateUserRequest> for NewUser {
    fn from(request: CreateUserRequest) -> Self {
        Self {
            username: request.username,
            email: request.email,
            password_hash: request.password_hash,
            is_admin: request.is_admin.unwrap_or(false),
        }
    }
}

/// Input for account creation; the password arrives already hashed
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub is_admin: bool,
}
