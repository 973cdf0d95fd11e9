use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::entities::{transfers, users};
use crate::error::AppError;
use crate::models::amount::{parse_amount, parse_id};

/// Transfer status values.
///
/// The workflow writes `completed` synchronously or nothing at all;
/// `pending` and `failed` are reserved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransferStatus {
    Pending,
    Completed,
    Failed,
}

impl std::fmt::Display for TransferStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransferStatus::Pending => write!(f, "pending"),
            TransferStatus::Completed => write!(f, "completed"),
            TransferStatus::Failed => write!(f, "failed"),
        }
    }
}

impl std::str::FromStr for TransferStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(TransferStatus::Pending),
            "completed" => Ok(TransferStatus::Completed),
            "failed" => Ok(TransferStatus::Failed),
            _ => Err(format!("Unknown transfer status: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransferDirection {
    Sent,
    Received,
}

/// Raw `POST /api/transfer` body, validated into a [`TransferCommand`]
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferRequest {
    pub recipient_id: Option<Value>,
    pub amount: Option<Value>,
}

/// A transfer that passed boundary validation: positive amount, distinct parties
#[derive(Debug, Clone, PartialEq)]
pub struct TransferCommand {
    sender_id: i32,
    recipient_id: i32,
    amount: Decimal,
}

impl TransferCommand {
    pub fn new(sender_id: i32, recipient_id: i32, amount: Decimal) -> Result<Self, AppError> {
        if amount <= Decimal::ZERO {
            return Err(AppError::InvalidRequest(
                "amount must be greater than zero".to_string(),
            ));
        }
        if sender_id == recipient_id {
            return Err(AppError::InvalidRequest(
                "Cannot transfer to yourself".to_string(),
            ));
        }
        Ok(Self {
            sender_id,
            recipient_id,
            amount,
        })
    }

    pub fn parse(sender_id: i32, req: &TransferRequest) -> Result<Self, AppError> {
        let recipient_id = parse_id(req.recipient_id.as_ref(), "recipientId")?;
        let amount = parse_amount(req.amount.as_ref())?;
        Self::new(sender_id, recipient_id, amount)
    }

    pub fn sender_id(&self) -> i32 {
        self.sender_id
    }

    pub fn recipient_id(&self) -> i32 {
        self.recipient_id
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferResponse {
    pub success: bool,
    pub transaction_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Counterparty {
    pub id: i32,
    pub uid: String,
    pub username: String,
}

impl From<&users::Model> for Counterparty {
    fn from(user: &users::Model) -> Self {
        Self {
            id: user.id,
            uid: user.uid.clone(),
            username: user.username.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferHistoryItem {
    pub transaction_id: String,
    pub direction: TransferDirection,
    pub amount: Decimal,
    pub currency: String,
    pub status: String,
    /// `None` when the other party has since been deleted
    pub counterparty: Option<Counterparty>,
    pub created_at: String,
}

impl TransferHistoryItem {
    /// Annotate a transfer from `viewer_id`'s point of view
    pub fn from_transfer(
        transfer: transfers::Model,
        viewer_id: i32,
        users: &HashMap<i32, users::Model>,
    ) -> Self {
        let (direction, other_id) = if transfer.from_user_id == viewer_id {
            (TransferDirection::Sent, transfer.to_user_id)
        } else {
            (TransferDirection::Received, transfer.from_user_id)
        };

        Self {
            transaction_id: transfer.transaction_id,
            direction,
            amount: transfer.amount,
            currency: transfer.currency,
            status: transfer.status,
            counterparty: users.get(&other_id).map(Counterparty::from),
            created_at: transfer.created_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferHistoryResponse {
    pub transfers: Vec<TransferHistoryItem>,
}
