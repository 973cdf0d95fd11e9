//! Simulated deposits and withdrawals
//!
//! Single-party version of the transfer workflow: ledger change, record row
//! and notification commit together, live events go out afterwards.

use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, DatabaseConnection, DatabaseTransaction, EntityTrait, Set, TransactionTrait};
use serde_json::json;
use tracing::{debug, info, warn};

use crate::entities::{deposits, notifications, users, withdrawals};
use crate::error::AppError;
use crate::models::funding::{DepositCommand, FundingStatus, WithdrawalCommand, WithdrawalOrigin};
use crate::models::notification::NotificationKind;
use crate::realtime::{ConnectionRegistry, LiveEvent};
use crate::services::{balance, currency, notification};
use crate::utility::{generate_reference, now};

#[derive(Debug, Clone)]
pub struct DepositReceipt {
    pub deposit: deposits::Model,
    pub balance: Decimal,
    pub notification: notifications::Model,
}

#[derive(Debug, Clone)]
pub struct WithdrawalReceipt {
    pub withdrawal: withdrawals::Model,
    pub balance: Decimal,
    pub notification: notifications::Model,
}

pub async fn deposit(
    db: &DatabaseConnection,
    registry: &ConnectionRegistry,
    cmd: DepositCommand,
) -> Result<DepositReceipt, AppError> {
    currency::find_active(db, &cmd.currency).await?;
    find_account(db, cmd.user_id).await?;

    let receipt = db
        .transaction::<_, DepositReceipt, AppError>(move |txn| {
            Box::pin(async move { apply_deposit(txn, &cmd).await })
        })
        .await?;

    let d = &receipt.deposit;
    info!(reference = %d.reference, user_id = d.user_id, amount = %d.amount, currency = %d.currency, "Deposit committed");

    let mut delivered = registry.push_live(
        d.user_id,
        &LiveEvent::DepositCreated {
            reference: d.reference.clone(),
            amount: d.amount,
            currency: d.currency.clone(),
        },
    );
    delivered += push_balance(registry, d.user_id, &d.currency, receipt.balance);
    delivered += notification::push_notification(registry, &receipt.notification);
    debug!(reference = %d.reference, delivered, "Deposit events pushed");

    Ok(receipt)
}

async fn apply_deposit(
    txn: &DatabaseTransaction,
    cmd: &DepositCommand,
) -> Result<DepositReceipt, AppError> {
    let balance = balance::credit(txn, cmd.user_id, &cmd.currency, cmd.amount).await?;

    let deposit = deposits::ActiveModel {
        reference: Set(generate_reference("DEP")),
        user_id: Set(cmd.user_id),
        amount: Set(cmd.amount),
        currency: Set(cmd.currency.clone()),
        method: Set(cmd.method.clone()),
        status: Set(FundingStatus::Completed.to_string()),
        created_at: Set(now()),
        ..Default::default()
    }
    .insert(txn)
    .await?;

    let notification = notification::notify(
        txn,
        cmd.user_id,
        NotificationKind::Deposit,
        "Deposit received",
        format!("{} {} was added to your account", cmd.amount, cmd.currency),
        Some(json!({
            "reference": deposit.reference,
            "amount": cmd.amount,
            "currency": cmd.currency,
            "method": cmd.method,
        })),
    )
    .await?;

    Ok(DepositReceipt {
        deposit,
        balance,
        notification,
    })
}

pub async fn withdraw(
    db: &DatabaseConnection,
    registry: &ConnectionRegistry,
    cmd: WithdrawalCommand,
    origin: WithdrawalOrigin,
) -> Result<WithdrawalReceipt, AppError> {
    currency::find_active(db, &cmd.currency).await?;
    let account = find_account(db, cmd.user_id).await?;

    if origin == WithdrawalOrigin::User && !account.can_withdraw() {
        warn!(user_id = account.id, "Withdrawal rejected, withdrawal access disabled");
        return Err(AppError::WithdrawalDisabled);
    }

    let receipt = db
        .transaction::<_, WithdrawalReceipt, AppError>(move |txn| {
            Box::pin(async move { apply_withdrawal(txn, &cmd).await })
        })
        .await?;

    let w = &receipt.withdrawal;
    info!(reference = %w.reference, user_id = w.user_id, amount = %w.amount, currency = %w.currency, ?origin, "Withdrawal committed");

    let mut delivered = registry.push_live(
        w.user_id,
        &LiveEvent::WithdrawalCreated {
            reference: w.reference.clone(),
            amount: w.amount,
            currency: w.currency.clone(),
        },
    );
    delivered += push_balance(registry, w.user_id, &w.currency, receipt.balance);
    delivered += notification::push_notification(registry, &receipt.notification);
    debug!(reference = %w.reference, delivered, "Withdrawal events pushed");

    Ok(receipt)
}

async fn apply_withdrawal(
    txn: &DatabaseTransaction,
    cmd: &WithdrawalCommand,
) -> Result<WithdrawalReceipt, AppError> {
    let balance = balance::debit(txn, cmd.user_id, &cmd.currency, cmd.amount).await?;

    let withdrawal = withdrawals::ActiveModel {
        reference: Set(generate_reference("WDR")),
        user_id: Set(cmd.user_id),
        amount: Set(cmd.amount),
        currency: Set(cmd.currency.clone()),
        destination: Set(cmd.destination.clone()),
        status: Set(FundingStatus::Completed.to_string()),
        created_at: Set(now()),
        ..Default::default()
    }
    .insert(txn)
    .await?;

    let notification = notification::notify(
        txn,
        cmd.user_id,
        NotificationKind::Withdrawal,
        "Withdrawal processed",
        format!("{} {} was withdrawn from your account", cmd.amount, cmd.currency),
        Some(json!({
            "reference": withdrawal.reference,
            "amount": cmd.amount,
            "currency": cmd.currency,
            "destination": cmd.destination,
        })),
    )
    .await?;

    Ok(WithdrawalReceipt {
        withdrawal,
        balance,
        notification,
    })
}

async fn find_account(db: &DatabaseConnection, user_id: i32) -> Result<users::Model, AppError> {
    users::Entity::find_by_id(user_id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {} not found", user_id)))
}

fn push_balance(registry: &ConnectionRegistry, user_id: i32, currency: &str, balance: Decimal) -> usize {
    registry.push_live(
        user_id,
        &LiveEvent::BalanceUpdate {
            currency: currency.to_string(),
            balance,
        },
    )
}
