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
                    .table(Transfers::Table)
                    .if_not_exists()
                    .col(pk_auto(Transfers::Id))
                    .col(string_uniq(Transfers::TransactionId))
                    .col(integer(Transfers::FromUserId))
                    .col(integer(Transfers::ToUserId))
                    .col(decimal_len(Transfers::Amount, 20, 8))
                    .col(string(Transfers::Currency))
                    .col(string(Transfers::Status))
                    .col(
                        timestamp_with_time_zone(Transfers::CreatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        timestamp_with_time_zone(Transfers::UpdatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_transfers_from_user_id")
                            .from(Transfers::Table, Transfers::FromUserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_transfers_to_user_id")
                            .from(Transfers::Table, Transfers::ToUserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // History lookups go through either side of the transfer
        manager
            .create_index(
                Index::create()
                    .name("idx_transfers_from_user_id")
                    .table(Transfers::Table)
                    .col(Transfers::FromUserId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_transfers_to_user_id")
                    .table(Transfers::Table)
                    .col(Transfers::ToUserId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Transfers::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Transfers {
    Table,
    Id,
    TransactionId,
    FromUserId,
    ToUserId,
    Amount,
    Currency,
    Status,
    CreatedAt,
    UpdatedAt,
}
