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
                    .table(Withdrawals::Table)
                    .if_not_exists()
                    .col(pk_auto(Withdrawals::Id))
                    .col(string_uniq(Withdrawals::Reference))
                    .col(integer(Withdrawals::UserId))
                    .col(decimal_len(Withdrawals::Amount, 20, 8))
                    .col(string(Withdrawals::Currency))
                    .col(string_null(Withdrawals::Destination))
                    .col(string(Withdrawals::Status))
                    .col(
                        timestamp_with_time_zone(Withdrawals::CreatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_withdrawals_user_id")
                            .from(Withdrawals::Table, Withdrawals::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_withdrawals_user_id")
                    .table(Withdrawals::Table)
                    .col(Withdrawals::UserId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Withdrawals::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Withdrawals {
    Table,
    Id,
    Reference,
    UserId,
    Amount,
    Currency,
    Destination,
    Status,
    CreatedAt,
}
