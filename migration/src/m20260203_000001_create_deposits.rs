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
                    .table(Deposits::Table)
                    .if_not_exists()
                    .col(pk_auto(Deposits::Id))
                    .col(string_uniq(Deposits::Reference))
                    .col(integer(Deposits::UserId))
                    .col(decimal_len(Deposits::Amount, 20, 8))
                    .col(string(Deposits::Currency))
                    .col(string(Deposits::Method))
                    .col(string(Deposits::Status))
                    .col(
                        timestamp_with_time_zone(Deposits::CreatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_deposits_user_id")
                            .from(Deposits::Table, Deposits::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_deposits_user_id")
                    .table(Deposits::Table)
                    .col(Deposits::UserId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Deposits::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Deposits {
    Table,
    Id,
    Reference,
    UserId,
    Amount,
    Currency,
    Method,
    Status,
    CreatedAt,
}
