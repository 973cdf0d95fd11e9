use axum::{
    extract::{rejection::QueryRejection, Query, State},
    Json,
};

use crate::error::AppError;
use crate::handlers::query_params;
use crate::models::currency::{CurrencyResponse, PricesQuery, PricesResponse};
use crate::services::currency;
use crate::AppState;

/// GET /api/currencies
pub async fn list_currencies(
    State(state): State<AppState>,
) -> Result<Json<Vec<CurrencyResponse>>, AppError> {
    let currencies = currency::list_currencies(&state.db, true)
        .await?
        .into_iter()
        .map(CurrencyResponse::from)
        .collect();
    Ok(Json(currencies))
}

/// GET /api/prices?symbols=BTC,ETH
pub async fn get_prices(
    State(state): State<AppState>,
    query: Result<Query<PricesQuery>, QueryRejection>,
) -> Result<Json<PricesResponse>, AppError> {
    let query = query_params(query)?;
    let prices = state
        .prices
        .prices(&state.db, query.symbols.as_deref())
        .await?;
    Ok(Json(prices))
}
