//! Application error taxonomy and its HTTP mapping

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use rust_decimal::Decimal;
use sea_orm::{DbErr, TransactionError};
use serde::{Deserialize, Serialize};
use tracing::error;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Malformed input, rejected before any state change
    #[error("{0}")]
    InvalidRequest(String),

    #[error("Transfers are disabled for this account")]
    TransferDisabled,

    #[error("Withdrawals are disabled for this account")]
    WithdrawalDisabled,

    #[error("Insufficient funds: attempted {attempted}, available {available}")]
    InsufficientFunds {
        attempted: Decimal,
        available: Decimal,
    },

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    /// Failure inside the atomic phase; the transaction was rolled back
    #[error("Transaction aborted: {0}")]
    TransactionAbort(#[source] DbErr),

    #[error("Database error: {0}")]
    Database(#[from] DbErr),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl AppError {
    /// Re-tag a plain database error raised inside a transaction
    pub fn into_abort(self) -> Self {
        match self {
            AppError::Database(e) => AppError::TransactionAbort(e),
            other => other,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::InvalidRequest(_) | AppError::InsufficientFunds { .. } => {
                StatusCode::BAD_REQUEST
            }
            AppError::TransferDisabled | AppError::WithdrawalDisabled | AppError::Forbidden(_) => {
                StatusCode::FORBIDDEN
            }
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::TransactionAbort(_) | AppError::Database(_) | AppError::Config(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AppError::InvalidRequest(_) => "INVALID_REQUEST",
            AppError::TransferDisabled => "TRANSFER_DISABLED",
            AppError::WithdrawalDisabled => "WITHDRAWAL_DISABLED",
            AppError::InsufficientFunds { .. } => "INSUFFICIENT_FUNDS",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Unauthorized(_) => "UNAUTHORIZED",
            AppError::Forbidden(_) => "FORBIDDEN",
            AppError::TransactionAbort(_) => "TRANSACTION_ABORTED",
            AppError::Database(_) => "DATABASE_ERROR",
            AppError::Config(_) => "CONFIG_ERROR",
        }
    }
}

impl From<TransactionError<AppError>> for AppError {
    fn from(err: TransactionError<AppError>) -> Self {
        match err {
            TransactionError::Connection(e) => AppError::TransactionAbort(e),
            TransactionError::Transaction(e) => e.into_abort(),
        }
    }
}

/// JSON error body returned by every failing endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!(code = self.code(), "Request failed: {}", self);
        }

        let details = match &self {
            AppError::InsufficientFunds {
                attempted,
                available,
            } => Some(serde_json::json!({
                "attempted": attempted,
                "available": available,
            })),
            _ => None,
        };

        let body = ErrorResponse {
            error: self.to_string(),
            code: Some(self.code().to_string()),
            details,
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_validation_errors_are_client_errors() {
        assert_eq!(
            AppError::InvalidRequest("bad".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::InsufficientFunds {
                attempted: dec!(40),
                available: dec!(10),
            }
            .status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(AppError::TransferDisabled.status_code(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_into_abort_only_retags_database_errors() {
        let abort = AppError::Database(DbErr::Custom("conflict".into())).into_abort();
        assert!(matches!(abort, AppError::TransactionAbort(_)));
        assert_eq!(abort.status_code(), StatusCode::INTERNAL_SERVER_ERROR);

        let funds = AppError::InsufficientFunds {
            attempted: dec!(1),
            available: dec!(0),
        }
        .into_abort();
        assert!(matches!(funds, AppError::InsufficientFunds { .. }));
    }

    #[test]
    fn test_insufficient_funds_message_carries_amounts() {
        let err = AppError::InsufficientFunds {
            attempted: dec!(40),
            available: dec!(10),
        };
        assert_eq!(
            err.to_string(),
            "Insufficient funds: attempted 40, available 10"
        );
        assert_eq!(err.code(), "INSUFFICIENT_FUNDS");
    }
}
