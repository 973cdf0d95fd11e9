use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    Json,
};

use crate::auth::AuthUser;
use crate::error::AppError;
use crate::handlers::{json_body, path_param};
use crate::models::transfer::{
    TransferCommand, TransferHistoryItem, TransferHistoryResponse, TransferRequest,
    TransferResponse,
};
use crate::services::transfer;
use crate::AppState;

/// POST /api/transfer
pub async fn create_transfer(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    payload: Result<Json<TransferRequest>, JsonRejection>,
) -> Result<Json<TransferResponse>, AppError> {
    let request = json_body(payload)?;
    let cmd = TransferCommand::parse(user.id, &request)?;

    let receipt = transfer::transfer(&state.db, &state.registry, cmd).await?;

    Ok(Json(TransferResponse {
        success: true,
        transaction_id: receipt.transfer.transaction_id,
    }))
}

/// GET /api/transfer-history
pub async fn transfer_history(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<TransferHistoryResponse>, AppError> {
    let transfers = transfer::history(&state.db, user.id).await?;
    Ok(Json(TransferHistoryResponse { transfers }))
}

/// GET /api/transfer-details/{transactionId}
pub async fn transfer_details(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    transaction_id: Result<Path<String>, PathRejection>,
) -> Result<Json<TransferHistoryItem>, AppError> {
    let transaction_id = path_param(transaction_id)?;
    let item = transfer::details(&state.db, user.id, &transaction_id).await?;
    Ok(Json(item))
}
