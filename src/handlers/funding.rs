use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};

use crate::auth::{AdminAuth, AuthUser};
use crate::error::AppError;
use crate::handlers::json_body;
use crate::models::funding::{
    DepositCommand, DepositRequest, FundingResponse, WithdrawalCommand, WithdrawalOrigin,
    WithdrawalRequest,
};
use crate::services::funding;
use crate::AppState;

/// POST /api/withdraw
pub async fn withdraw(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    payload: Result<Json<WithdrawalRequest>, JsonRejection>,
) -> Result<Json<FundingResponse>, AppError> {
    let request = json_body(payload)?;
    let cmd = WithdrawalCommand::parse_for_user(user.id, &request)?;

    let receipt = funding::withdraw(&state.db, &state.registry, cmd, WithdrawalOrigin::User).await?;

    Ok(Json(FundingResponse {
        success: true,
        reference: receipt.withdrawal.reference,
        currency: receipt.withdrawal.currency,
        balance: receipt.balance,
    }))
}

/// POST /api/admin/deposits
pub async fn admin_deposit(
    State(state): State<AppState>,
    _admin: AdminAuth,
    payload: Result<Json<DepositRequest>, JsonRejection>,
) -> Result<Json<FundingResponse>, AppError> {
    let request = json_body(payload)?;
    let cmd = DepositCommand::parse(&request)?;

    let receipt = funding::deposit(&state.db, &state.registry, cmd).await?;

    Ok(Json(FundingResponse {
        success: true,
        reference: receipt.deposit.reference,
        currency: receipt.deposit.currency,
        balance: receipt.balance,
    }))
}

/// POST /api/admin/withdrawals
///
/// Admin withdrawals ignore the account's withdrawal-access flag.
pub async fn admin_withdraw(
    State(state): State<AppState>,
    _admin: AdminAuth,
    payload: Result<Json<WithdrawalRequest>, JsonRejection>,
) -> Result<Json<FundingResponse>, AppError> {
    let request = json_body(payload)?;
    let cmd = WithdrawalCommand::parse_for_admin(&request)?;

    let receipt = funding::withdraw(&state.db, &state.registry, cmd, WithdrawalOrigin::Admin).await?;

    Ok(Json(FundingResponse {
        success: true,
        reference: receipt.withdrawal.reference,
        currency: receipt.withdrawal.currency,
        balance: receipt.balance,
    }))
}
