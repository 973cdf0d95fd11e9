//! Migration to create the users table
//!
//! `balance` is a denormalized mirror of the user's USD balance entry.
//! `transfer_access` / `withdrawal_access` are nullable: only an explicit
//! `false` disables the feature.

use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(pk_auto(Users::Id))
                    .col(string_uniq(Users::Uid))
                    .col(string_uniq(Users::Username))
                    .col(string_uniq(Users::Email))
                    .col(string(Users::PasswordHash))
                    .col(boolean(Users::IsVerified).default(false))
                    .col(boolean(Users::IsAdmin).default(false))
                    .col(boolean_null(Users::TransferAccess))
                    .col(boolean_null(Users::WithdrawalAccess))
                    .col(decimal_len(Users::Balance, 20, 8).default(0))
                    .col(
                        timestamp_with_time_zone(Users::CreatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        timestamp_with_time_zone(Users::UpdatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub(crate) enum Users {
    Table,
    Id,
    Uid,
    Username,
    Email,
    PasswordHash,
    IsVerified,
    IsAdmin,
    TransferAccess,
    WithdrawalAccess,
    Balance,
    CreatedAt,
    UpdatedAt,
}
