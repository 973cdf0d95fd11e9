pub use sea_orm_migration::prelude::*;

mod m20260201_000001_create_users;
mod m20260201_000002_create_currencies;
mod m20260201_000003_create_balances;
mod m20260201_000004_create_transfers;
mod m20260201_000005_create_notifications;
mod m20260203_000001_create_deposits;
mod m20260203_000002_create_withdrawals;
mod m20260204_000001_seed_currencies;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260201_000001_create_users::Migration),
            Box::new(m20260201_000002_create_currencies::Migration),
            Box::new(m20260201_000003_create_balances::Migration),
            Box::new(m20260201_000004_create_transfers::Migration),
            Box::new(m20260201_000005_create_notifications::Migration),
            Box::new(m20260203_000001_create_deposits::Migration),
            Box::new(m20260203_000002_create_withdrawals::Migration),
            Box::new(m20260204_000001_seed_currencies::Migration),
        ]
    }
}
