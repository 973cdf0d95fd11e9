//! Durable per-user notifications and their live fan-out

use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};
use serde_json::Value;
use tracing::debug;

use crate::entities::notifications;
use crate::error::AppError;
use crate::models::notification::{NotificationKind, NotificationResponse};
use crate::realtime::{ConnectionRegistry, LiveEvent};
use crate::utility::now;

const DEFAULT_LIST_LIMIT: u64 = 50;
const MAX_LIST_LIMIT: u64 = 200;

/// Persist a notification. This row is the durable record; live delivery
/// is a separate, best-effort step.
pub async fn notify<C: ConnectionTrait>(
    conn: &C,
    user_id: i32,
    kind: NotificationKind,
    title: impl Into<String>,
    message: impl Into<String>,
    data: Option<Value>,
) -> Result<notifications::Model, DbErr> {
    let model = notifications::ActiveModel {
        user_id: Set(user_id),
        kind: Set(kind.to_string()),
        title: Set(title.into()),
        message: Set(message.into()),
        data: Set(data),
        is_read: Set(false),
        created_at: Set(now()),
        ..Default::default()
    }
    .insert(conn)
    .await?;

    debug!(user_id, kind = %kind, notification_id = model.id, "Notification stored");
    Ok(model)
}

/// Push a stored notification to the owner's open connections
pub fn push_notification(registry: &ConnectionRegistry, notification: &notifications::Model) -> usize {
    registry.push_live(
        notification.user_id,
        &LiveEvent::NotificationUpdate {
            notification: NotificationResponse::from(notification.clone()),
        },
    )
}

/// Newest first
pub async fn list<C: ConnectionTrait>(
    conn: &C,
    user_id: i32,
    unread_only: bool,
    limit: Option<u64>,
) -> Result<Vec<notifications::Model>, DbErr> {
    let limit = limit.unwrap_or(DEFAULT_LIST_LIMIT).clamp(1, MAX_LIST_LIMIT);

    let mut query = notifications::Entity::find().filter(notifications::Column::UserId.eq(user_id));
    if unread_only {
        query = query.filter(notifications::Column::IsRead.eq(false));
    }

    query
        .order_by_desc(notifications::Column::CreatedAt)
        .order_by_desc(notifications::Column::Id)
        .limit(limit)
        .all(conn)
        .await
}

pub async fn unread_count<C: ConnectionTrait>(conn: &C, user_id: i32) -> Result<u64, DbErr> {
    notifications::Entity::find()
        .filter(notifications::Column::UserId.eq(user_id))
        .filter(notifications::Column::IsRead.eq(false))
        .count(conn)
        .await
}

/// Flip `is_read` on one of the caller's notifications
pub async fn mark_read<C: ConnectionTrait>(
    conn: &C,
    user_id: i32,
    notification_id: i32,
) -> Result<notifications::Model, AppError> {
    let existing = notifications::Entity::find_by_id(notification_id)
        .filter(notifications::Column::UserId.eq(user_id))
        .one(conn)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Notification {} not found", notification_id)))?;

    if existing.is_read {
        return Ok(existing);
    }

    let mut active: notifications::ActiveModel = existing.into();
    active.is_read = Set(true);
    Ok(active.update(conn).await?)
}

/// Returns how many rows changed
pub async fn mark_all_read<C: ConnectionTrait>(conn: &C, user_id: i32) -> Result<u64, DbErr> {
    let result = notifications::Entity::update_many()
        .col_expr(notifications::Column::IsRead, Expr::value(true))
        .filter(notifications::Column::UserId.eq(user_id))
        .filter(notifications::Column::IsRead.eq(false))
        .exec(conn)
        .await?;
    Ok(result.rows_affected)
}
