//! Seed the static currency reference rows

use sea_orm_migration::prelude::*;

use super::m20260201_000002_create_currencies::Currencies;

/// (symbol, display name, price feed id)
const SEED: &[(&str, &str, Option<&str>)] = &[
    ("USD", "US Dollar", None),
    ("BTC", "Bitcoin", Some("bitcoin")),
    ("ETH", "Ethereum", Some("ethereum")),
    ("USDT", "Tether", Some("tether")),
];

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let mut insert = Query::insert()
            .into_table(Currencies::Table)
            .columns([
                Currencies::Symbol,
                Currencies::Name,
                Currencies::PriceFeedId,
                Currencies::IsActive,
            ])
            .to_owned();

        for (symbol, name, feed_id) in SEED {
            insert.values_panic([
                (*symbol).into(),
                (*name).into(),
                feed_id.map(str::to_string).into(),
                true.into(),
            ]);
        }

        manager.exec_stmt(insert).await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let symbols: Vec<&str> = SEED.iter().map(|(symbol, _, _)| *symbol).collect();
        let delete = Query::delete()
            .from_table(Currencies::Table)
            .and_where(Expr::col(Currencies::Symbol).is_in(symbols))
            .to_owned();

        manager.exec_stmt(delete).await
    }
}
