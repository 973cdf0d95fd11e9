//! Accounts and the admin operations on them

use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set,
};
use serde_json::json;
use tracing::info;

use crate::entities::{notifications, prelude::*, users};
use crate::error::AppError;
use crate::models::notification::NotificationKind;
use crate::models::user::{AccessUpdateRequest, NewUser};
use crate::realtime::ConnectionRegistry;
use crate::services::notification;
use crate::utility::{generate_uid, now};

const MAX_USERNAME_LEN: usize = 50;
const MAX_TITLE_LEN: usize = 200;
const UID_ATTEMPTS: usize = 5;

pub async fn create_user(db: &DatabaseConnection, new_user: NewUser) -> Result<users::Model, AppError> {
    let username = new_user.username.trim().to_string();
    let email = new_user.email.trim().to_lowercase();

    if username.is_empty() || username.chars().count() > MAX_USERNAME_LEN {
        return Err(AppError::InvalidRequest(format!(
            "username must be 1 to {} characters",
            MAX_USERNAME_LEN
        )));
    }
    if !email.contains('@') {
        return Err(AppError::InvalidRequest("email is invalid".to_string()));
    }
    if new_user.password_hash.is_empty() {
        return Err(AppError::InvalidRequest("password hash is required".to_string()));
    }

    let taken = Users::find()
        .filter(
            Condition::any()
                .add(users::Column::Username.eq(username.as_str()))
                .add(users::Column::Email.eq(email.as_str())),
        )
        .count(db)
        .await?;
    if taken > 0 {
        return Err(AppError::InvalidRequest(
            "username or email already registered".to_string(),
        ));
    }

    let uid = unused_uid(db).await?;
    let ts = now();
    let user = users::ActiveModel {
        uid: Set(uid),
        username: Set(username),
        email: Set(email),
        password_hash: Set(new_user.password_hash),
        is_verified: Set(false),
        is_admin: Set(new_user.is_admin),
        transfer_access: Set(None),
        withdrawal_access: Set(None),
        balance: Set(Decimal::ZERO),
        created_at: Set(ts),
        updated_at: Set(ts),
        ..Default::default()
    }
    .insert(db)
    .await?;

    info!(user_id = user.id, uid = %user.uid, "User created");
    Ok(user)
}

async fn unused_uid(db: &DatabaseConnection) -> Result<String, AppError> {
    for _ in 0..UID_ATTEMPTS {
        let candidate = generate_uid();
        let exists = Users::find()
            .filter(users::Column::Uid.eq(candidate.as_str()))
            .count(db)
            .await?;
        if exists == 0 {
            return Ok(candidate);
        }
    }
    Err(AppError::Database(DbErr::Custom(
        "could not allocate a unique uid".to_string(),
    )))
}

pub async fn find_user(db: &DatabaseConnection, id: i32) -> Result<users::Model, AppError> {
    Users::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {} not found", id)))
}

pub async fn list_users(db: &DatabaseConnection) -> Result<Vec<users::Model>, DbErr> {
    Users::find()
        .order_by_asc(users::Column::Id)
        .all(db)
        .await
}

/// Admin toggle for the two access flags; absent fields stay as they are
pub async fn set_access(
    db: &DatabaseConnection,
    id: i32,
    update: &AccessUpdateRequest,
) -> Result<users::Model, AppError> {
    if update.transfer_access.is_none() && update.withdrawal_access.is_none() {
        return Err(AppError::InvalidRequest(
            "transferAccess or withdrawalAccess is required".to_string(),
        ));
    }

    let user = find_user(db, id).await?;
    let mut active: users::ActiveModel = user.into();
    if let Some(flag) = update.transfer_access {
        active.transfer_access = Set(Some(flag));
    }
    if let Some(flag) = update.withdrawal_access {
        active.withdrawal_access = Set(Some(flag));
    }
    active.updated_at = Set(now());
    let user = active.update(db).await?;

    info!(
        user_id = user.id,
        transfer_access = ?user.transfer_access,
        withdrawal_access = ?user.withdrawal_access,
        "Access flags updated"
    );
    Ok(user)
}

/// Admin broadcast to one user: stored as a `system` notification, then pushed
pub async fn send_system_message(
    db: &DatabaseConnection,
    registry: &ConnectionRegistry,
    id: i32,
    title: &str,
    message: &str,
) -> Result<notifications::Model, AppError> {
    let title = title.trim();
    let message = message.trim();
    if title.is_empty() || title.chars().count() > MAX_TITLE_LEN {
        return Err(AppError::InvalidRequest(format!(
            "title must be 1 to {} characters",
            MAX_TITLE_LEN
        )));
    }
    if message.is_empty() {
        return Err(AppError::InvalidRequest("message is required".to_string()));
    }

    let user = find_user(db, id).await?;
    let stored = notification::notify(
        db,
        user.id,
        NotificationKind::System,
        title,
        message,
        Some(json!({ "source": "admin" })),
    )
    .await?;

    let delivered = notification::push_notification(registry, &stored);
    info!(user_id = user.id, notification_id = stored.id, delivered, "System message sent");
    Ok(stored)
}
