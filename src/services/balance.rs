//! Balance store: per-user, per-currency ledger rows
//!
//! Every function takes a generic `ConnectionTrait` so the same code runs
//! against the pool for reads and inside a `DatabaseTransaction` for
//! mutations. Read-modify-write paths lock the row with `FOR UPDATE`.

use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use tracing::debug;

use crate::entities::{balances, users};
use crate::error::AppError;
use crate::models::amount::MAX_AMOUNT;
use crate::utility::now;

/// Currency mirrored onto `users.balance`
pub const DEFAULT_CURRENCY: &str = "USD";

/// Current amount, or zero when no entry exists. Never creates a row.
pub async fn get_balance<C: ConnectionTrait>(
    conn: &C,
    user_id: i32,
    currency: &str,
) -> Result<Decimal, DbErr> {
    let entry = balances::Entity::find()
        .filter(balances::Column::UserId.eq(user_id))
        .filter(balances::Column::Currency.eq(currency))
        .one(conn)
        .await?;

    Ok(entry.map(|e| e.amount).unwrap_or(Decimal::ZERO))
}

pub async fn list_balances<C: ConnectionTrait>(
    conn: &C,
    user_id: i32,
) -> Result<Vec<balances::Model>, DbErr> {
    balances::Entity::find()
        .filter(balances::Column::UserId.eq(user_id))
        .order_by_asc(balances::Column::Currency)
        .all(conn)
        .await
}

/// Add `amount`, creating the entry on first use. Returns the new total.
pub async fn credit<C: ConnectionTrait>(
    conn: &C,
    user_id: i32,
    currency: &str,
    amount: Decimal,
) -> Result<Decimal, AppError> {
    ensure_positive(amount)?;

    let total = match find_for_update(conn, user_id, currency).await? {
        Some(entry) => {
            let total = entry
                .amount
                .checked_add(amount)
                .filter(|t| *t <= MAX_AMOUNT)
                .ok_or_else(|| {
                    AppError::InvalidRequest(format!(
                        "balance cannot exceed {} {}",
                        MAX_AMOUNT, currency
                    ))
                })?;
            let mut active: balances::ActiveModel = entry.into();
            active.amount = Set(total);
            active.updated_at = Set(now());
            active.update(conn).await?;
            total
        }
        None => {
            let ts = now();
            balances::ActiveModel {
                user_id: Set(user_id),
                currency: Set(currency.to_string()),
                amount: Set(amount),
                created_at: Set(ts),
                updated_at: Set(ts),
                ..Default::default()
            }
            .insert(conn)
            .await?;
            amount
        }
    };

    mirror_user_balance(conn, user_id, currency, total).await?;
    debug!(user_id, currency, %amount, %total, "Balance credited");
    Ok(total)
}

/// Subtract `amount`. Fails with `InsufficientFunds` when the entry is
/// missing or smaller than `amount`. Returns the new total.
///
/// This is the only debit path; transfers and withdrawals both use it.
pub async fn debit<C: ConnectionTrait>(
    conn: &C,
    user_id: i32,
    currency: &str,
    amount: Decimal,
) -> Result<Decimal, AppError> {
    ensure_positive(amount)?;

    let entry = find_for_update(conn, user_id, currency)
        .await?
        .ok_or(AppError::InsufficientFunds {
            attempted: amount,
            available: Decimal::ZERO,
        })?;

    if entry.amount < amount {
        return Err(AppError::InsufficientFunds {
            attempted: amount,
            available: entry.amount,
        });
    }

    let total = (entry.amount - amount).max(Decimal::ZERO);
    let mut active: balances::ActiveModel = entry.into();
    active.amount = Set(total);
    active.updated_at = Set(now());
    active.update(conn).await?;

    mirror_user_balance(conn, user_id, currency, total).await?;
    debug!(user_id, currency, %amount, %total, "Balance debited");
    Ok(total)
}

async fn find_for_update<C: ConnectionTrait>(
    conn: &C,
    user_id: i32,
    currency: &str,
) -> Result<Option<balances::Model>, DbErr> {
    balances::Entity::find()
        .filter(balances::Column::UserId.eq(user_id))
        .filter(balances::Column::Currency.eq(currency))
        .lock_exclusive()
        .one(conn)
        .await
}

async fn mirror_user_balance<C: ConnectionTrait>(
    conn: &C,
    user_id: i32,
    currency: &str,
    total: Decimal,
) -> Result<(), DbErr> {
    if currency != DEFAULT_CURRENCY {
        return Ok(());
    }

    users::Entity::update_many()
        .col_expr(users::Column::Balance, Expr::value(total))
        .col_expr(users::Column::UpdatedAt, Expr::value(now()))
        .filter(users::Column::Id.eq(user_id))
        .exec(conn)
        .await?;
    Ok(())
}

fn ensure_positive(amount: Decimal) -> Result<(), AppError> {
    if amount <= Decimal::ZERO {
        return Err(AppError::InvalidRequest(
            "amount must be greater than zero".to_string(),
        ));
    }
    if amount > MAX_AMOUNT {
        return Err(AppError::InvalidRequest(format!(
            "amount must not exceed {}",
            MAX_AMOUNT
        )));
    }
    Ok(())
}
