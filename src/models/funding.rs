use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::AppError;
use crate::models::amount::{parse_amount, parse_currency, parse_id};

const DEFAULT_DEPOSIT_METHOD: &str = "admin";
const MAX_TEXT_LEN: usize = 128;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FundingStatus {
    Pending,
    Completed,
    Failed,
}

impl std::fmt::Display for FundingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FundingStatus::Pending => write!(f, "pending"),
            FundingStatus::Completed => write!(f, "completed"),
            FundingStatus::Failed => write!(f, "failed"),
        }
    }
}

/// Who initiated a withdrawal; only user-initiated ones honour the
/// account's withdrawal-access flag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WithdrawalOrigin {
    User,
    Admin,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepositRequest {
    pub user_id: Option<Value>,
    pub amount: Option<Value>,
    pub currency: Option<String>,
    pub method: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DepositCommand {
    pub user_id: i32,
    pub amount: Decimal,
    pub currency: String,
    pub method: String,
}

impl DepositCommand {
    pub fn parse(req: &DepositRequest) -> Result<Self, AppError> {
        Ok(Self {
            user_id: parse_id(req.user_id.as_ref(), "userId")?,
            amount: parse_amount(req.amount.as_ref())?,
            currency: parse_currency(req.currency.as_deref())?,
            method: optional_text(req.method.as_deref(), "method")?
                .unwrap_or_else(|| DEFAULT_DEPOSIT_METHOD.to_string()),
        })
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawalRequest {
    /// Only read on the admin route; the user route takes the caller's id
    pub user_id: Option<Value>,
    pub amount: Option<Value>,
    pub currency: Option<String>,
    pub destination: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WithdrawalCommand {
    pub user_id: i32,
    pub amount: Decimal,
    pub currency: String,
    pub destination: Option<String>,
}

impl WithdrawalCommand {
    pub fn parse_for_user(user_id: i32, req: &WithdrawalRequest) -> Result<Self, AppError> {
        Ok(Self {
            user_id,
            amount: parse_amount(req.amount.as_ref())?,
            currency: parse_currency(req.currency.as_deref())?,
            destination: optional_text(req.destination.as_deref(), "destination")?,
        })
    }

    pub fn parse_for_admin(req: &WithdrawalRequest) -> Result<Self, AppError> {
        let user_id = parse_id(req.user_id.as_ref(), "userId")?;
        Self::parse_for_user(user_id, req)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FundingResponse {
    pub success: bool,
    pub reference: String,
    pub currency: String,
    pub balance: Decimal,
}

fn optional_text(raw: Option<&str>, field: &str) -> Result<Option<String>, AppError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(s) if s.chars().count() > MAX_TEXT_LEN => Err(AppError::InvalidRequest(format!(
            "{} must be at most {} characters",
            field, MAX_TEXT_LEN
        ))),
        Some(s) => Ok(Some(s.to_string())),
    }
}
