use sea_orm::{ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder};

use crate::entities::{currencies, prelude::*};
use crate::error::AppError;

pub async fn list_currencies<C: ConnectionTrait>(
    conn: &C,
    active_only: bool,
) -> Result<Vec<currencies::Model>, DbErr> {
    let mut query = Currencies::find();
    if active_only {
        query = query.filter(currencies::Column::IsActive.eq(true));
    }
    query.order_by_asc(currencies::Column::Id).all(conn).await
}

/// Ledger operations only accept known, active currencies
pub async fn find_active<C: ConnectionTrait>(
    conn: &C,
    symbol: &str,
) -> Result<currencies::Model, AppError> {
    let currency = Currencies::find()
        .filter(currencies::Column::Symbol.eq(symbol))
        .one(conn)
        .await?;

    match currency {
        Some(c) if c.is_active => Ok(c),
        Some(_) => Err(AppError::InvalidRequest(format!(
            "Currency {} is not active",
            symbol
        ))),
        None => Err(AppError::InvalidRequest(format!(
            "Unsupported currency: {}",
            symbol
        ))),
    }
}
