//! Migration to create the balances ledger
//!
//! One row per (user, currency). Non-negativity is enforced by the
//! application's debit path, not by a constraint.

use sea_orm_migration::{prelude::*, schema::*};

use super::m20260201_000001_create_users::Users;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Balances::Table)
                    .if_not_exists()
                    .col(pk_auto(Balances::Id))
                    .col(integer(Balances::UserId))
                    .col(string(Balances::Currency))
                    .col(decimal_len(Balances::Amount, 20, 8).default(0))
                    .col(
                        timestamp_with_time_zone(Balances::CreatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        timestamp_with_time_zone(Balances::UpdatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_balances_user_id")
                            .from(Balances::Table, Balances::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_balances_user_currency")
                    .table(Balances::Table)
                    .col(Balances::UserId)
                    .col(Balances::Currency)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Balances::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Balances {
    Table,
    Id,
    UserId,
    Currency,
    Amount,
    CreatedAt,
    UpdatedAt,
}
