//! Peer-to-peer transfer workflow
//!
//! Validation happens before the transaction and has no side effects.
//! Debit, credit, the transfer record and both notifications are written in
//! one database transaction; any failure there rolls everything back and is
//! reported as `TransactionAbort` (except the domain errors raised by the
//! balance store, which pass through unchanged). Live pushes run only after
//! commit and can never affect the result.

use std::collections::{HashMap, HashSet};

use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, DatabaseTransaction, DbErr,
    EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde_json::json;
use tracing::{debug, info, warn};

use crate::entities::{notifications, transfers, users};
use crate::error::AppError;
use crate::models::notification::NotificationKind;
use crate::models::transfer::{
    TransferCommand, TransferDirection, TransferHistoryItem, TransferStatus,
};
use crate::realtime::{ConnectionRegistry, LiveEvent};
use crate::services::balance::{self, DEFAULT_CURRENCY};
use crate::services::notification;
use crate::utility::{generate_transaction_id, now};

/// Everything written by one committed transfer
#[derive(Debug, Clone)]
pub struct TransferReceipt {
    pub transfer: transfers::Model,
    pub sender_balance: Decimal,
    pub recipient_balance: Decimal,
    pub sender_notification: notifications::Model,
    pub recipient_notification: notifications::Model,
}

pub async fn transfer(
    db: &DatabaseConnection,
    registry: &ConnectionRegistry,
    cmd: TransferCommand,
) -> Result<TransferReceipt, AppError> {
    let sender = users::Entity::find_by_id(cmd.sender_id())
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Sender not found".to_string()))?;

    if !sender.can_transfer() {
        warn!(user_id = sender.id, "Transfer rejected, transfer access disabled");
        return Err(AppError::TransferDisabled);
    }

    let recipient = users::Entity::find_by_id(cmd.recipient_id())
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Recipient not found".to_string()))?;

    let receipt = db
        .transaction::<_, TransferReceipt, AppError>(move |txn| {
            Box::pin(async move { apply_transfer(txn, &sender, &recipient, &cmd).await })
        })
        .await?;

    info!(
        transaction_id = %receipt.transfer.transaction_id,
        from = receipt.transfer.from_user_id,
        to = receipt.transfer.to_user_id,
        amount = %receipt.transfer.amount,
        "Transfer committed"
    );

    publish_transfer(registry, &receipt);
    Ok(receipt)
}

async fn apply_transfer(
    txn: &DatabaseTransaction,
    sender: &users::Model,
    recipient: &users::Model,
    cmd: &TransferCommand,
) -> Result<TransferReceipt, AppError> {
    let amount = cmd.amount();

    let sender_balance = balance::debit(txn, sender.id, DEFAULT_CURRENCY, amount).await?;
    let recipient_balance = balance::credit(txn, recipient.id, DEFAULT_CURRENCY, amount).await?;

    let transaction_id = generate_transaction_id();
    let ts = now();
    let transfer = transfers::ActiveModel {
        transaction_id: Set(transaction_id.clone()),
        from_user_id: Set(sender.id),
        to_user_id: Set(recipient.id),
        amount: Set(amount),
        currency: Set(DEFAULT_CURRENCY.to_string()),
        status: Set(TransferStatus::Completed.to_string()),
        created_at: Set(ts),
        updated_at: Set(ts),
        ..Default::default()
    }
    .insert(txn)
    .await?;

    let sender_notification = notification::notify(
        txn,
        sender.id,
        NotificationKind::TransferSent,
        "Transfer sent",
        format!("You sent {} {} to {}", amount, DEFAULT_CURRENCY, recipient.username),
        Some(json!({
            "transactionId": transaction_id,
            "amount": amount,
            "currency": DEFAULT_CURRENCY,
            "counterpartyId": recipient.id,
            "counterpartyUsername": recipient.username,
        })),
    )
    .await?;

    let recipient_notification = notification::notify(
        txn,
        recipient.id,
        NotificationKind::TransferReceived,
        "Transfer received",
        format!("You received {} {} from {}", amount, DEFAULT_CURRENCY, sender.username),
        Some(json!({
            "transactionId": transaction_id,
            "amount": amount,
            "currency": DEFAULT_CURRENCY,
            "counterpartyId": sender.id,
            "counterpartyUsername": sender.username,
        })),
    )
    .await?;

    Ok(TransferReceipt {
        transfer,
        sender_balance,
        recipient_balance,
        sender_notification,
        recipient_notification,
    })
}

fn publish_transfer(registry: &ConnectionRegistry, receipt: &TransferReceipt) {
    let t = &receipt.transfer;
    let legs = [
        (
            t.from_user_id,
            TransferDirection::Sent,
            t.to_user_id,
            receipt.sender_balance,
            &receipt.sender_notification,
        ),
        (
            t.to_user_id,
            TransferDirection::Received,
            t.from_user_id,
            receipt.recipient_balance,
            &receipt.recipient_notification,
        ),
    ];

    let mut delivered = 0;
    for (user_id, direction, counterparty_id, balance, stored) in legs {
        delivered += registry.push_live(
            user_id,
            &LiveEvent::TransferCreated {
                transaction_id: t.transaction_id.clone(),
                direction,
                amount: t.amount,
                currency: t.currency.clone(),
                counterparty_id,
            },
        );
        delivered += registry.push_live(
            user_id,
            &LiveEvent::BalanceUpdate {
                currency: t.currency.clone(),
                balance,
            },
        );
        delivered += notification::push_notification(registry, stored);
    }

    debug!(transaction_id = %t.transaction_id, delivered, "Transfer events pushed");
}

/// The caller's transfers, either side, newest first
pub async fn history(
    db: &DatabaseConnection,
    user_id: i32,
) -> Result<Vec<TransferHistoryItem>, DbErr> {
    let rows = transfers::Entity::find()
        .filter(
            Condition::any()
                .add(transfers::Column::FromUserId.eq(user_id))
                .add(transfers::Column::ToUserId.eq(user_id)),
        )
        .order_by_desc(transfers::Column::CreatedAt)
        .order_by_desc(transfers::Column::Id)
        .all(db)
        .await?;

    let counterparty_ids: HashSet<i32> = rows
        .iter()
        .map(|t| {
            if t.from_user_id == user_id {
                t.to_user_id
            } else {
                t.from_user_id
            }
        })
        .collect();

    let counterparties = load_users(db, counterparty_ids).await?;

    Ok(rows
        .into_iter()
        .map(|t| TransferHistoryItem::from_transfer(t, user_id, &counterparties))
        .collect())
}

/// Single transfer, visible only to its two participants
pub async fn details(
    db: &DatabaseConnection,
    user_id: i32,
    transaction_id: &str,
) -> Result<TransferHistoryItem, AppError> {
    let transfer = transfers::Entity::find()
        .filter(transfers::Column::TransactionId.eq(transaction_id))
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Transfer {} not found", transaction_id)))?;

    if transfer.from_user_id != user_id && transfer.to_user_id != user_id {
        warn!(user_id, transaction_id, "Transfer lookup by non-participant");
        return Err(AppError::Forbidden(
            "Not authorized to view this transfer".to_string(),
        ));
    }

    let other_id = if transfer.from_user_id == user_id {
        transfer.to_user_id
    } else {
        transfer.from_user_id
    };
    let counterparties = load_users(db, [other_id]).await?;

    Ok(TransferHistoryItem::from_transfer(
        transfer,
        user_id,
        &counterparties,
    ))
}

async fn load_users(
    db: &DatabaseConnection,
    ids: impl IntoIterator<Item = i32>,
) -> Result<HashMap<i32, users::Model>, DbErr> {
    let ids: Vec<i32> = ids.into_iter().collect();
    if ids.is_empty() {
        return Ok(HashMap::new());
    }

    Ok(users::Entity::find()
        .filter(users::Column::Id.is_in(ids))
        .all(db)
        .await?
        .into_iter()
        .map(|u| (u.id, u))
        .collect())
}
