use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Currencies::Table)
                    .if_not_exists()
                    .col(pk_auto(Currencies::Id))
                    .col(string_uniq(Currencies::Symbol))
                    .col(string(Currencies::Name))
                    .col(string_null(Currencies::PriceFeedId))
                    .col(boolean(Currencies::IsActive).default(true))
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Currencies::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub(crate) enum Currencies {
    Table,
    Id,
    Symbol,
    Name,
    PriceFeedId,
    IsActive,
}
