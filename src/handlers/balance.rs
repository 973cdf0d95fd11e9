use axum::{
    extract::{rejection::QueryRejection, Query, State},
    Json,
};

use crate::auth::AuthUser;
use crate::error::AppError;
use crate::handlers::query_params;
use crate::models::amount::parse_currency;
use crate::models::balance::{BalanceQuery, BalanceResponse, BalancesResponse};
use crate::models::user::{MeResponse, UserResponse};
use crate::services::balance;
use crate::AppState;

/// GET /api/balance?currency=USD
///
/// Read-only: an account with no entry reports zero and nothing is created.
pub async fn get_balance(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    query: Result<Query<BalanceQuery>, QueryRejection>,
) -> Result<Json<BalanceResponse>, AppError> {
    let query = query_params(query)?;
    let currency = parse_currency(query.currency.as_deref())?;
    let amount = balance::get_balance(&state.db, user.id, &currency).await?;

    Ok(Json(BalanceResponse {
        currency,
        balance: amount,
    }))
}

/// GET /api/balances
pub async fn list_balances(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<BalancesResponse>, AppError> {
    let balances = balance::list_balances(&state.db, user.id)
        .await?
        .into_iter()
        .map(BalanceResponse::from)
        .collect();

    Ok(Json(BalancesResponse { balances }))
}

/// GET /api/me
pub async fn me(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<MeResponse>, AppError> {
    let balances = balance::list_balances(&state.db, user.id)
        .await?
        .into_iter()
        .map(BalanceResponse::from)
        .collect();

    Ok(Json(MeResponse {
        user: UserResponse::from(user),
        balances,
    }))
}
