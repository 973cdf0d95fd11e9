#![allow(dead_code)]

use std::collections::HashMap;
use std::env;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use coinfolio_backend::{
    app::build_router,
    config::AppConfig,
    entities::users,
    models::{funding::DepositCommand, user::NewUser},
    realtime::ConnectionRegistry,
    services::{
        funding,
        prices::{PriceError, PriceService, PriceSource},
        users as user_service,
    },
    AppState,
};
use migration::{Migrator, MigratorTrait};
use rust_decimal::Decimal;
use sea_orm::{
    ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbBackend, DbErr, Statement,
};
use uuid::Uuid;

pub const ADMIN_KEY: &str = "test-admin-key";

/// Postgres server used by the integration tests.
/// Uses TEST_DATABASE_URL environment variable or falls back to default
pub fn test_database_url() -> String {
    env::var("TEST_DATABASE_URL").unwrap_or_else(|_| {
        "postgresql://coinfolio_user@localhost:5432/coinfolio_test".to_string()
    })
}

/// Connection to a freshly created schema with all migrations applied.
///
/// Every test gets its own schema, so tests can run in parallel against one
/// server. The pool holds several connections so concurrent transfers really
/// contend on the balance row locks.
pub async fn setup_test_db() -> DatabaseConnection {
    let url = test_database_url();
    let schema = format!("test_{}", Uuid::new_v4().simple());

    let admin = Database::connect(url.as_str())
        .await
        .expect("Test database connection should succeed");
    admin
        .execute_unprepared(&format!("CREATE SCHEMA \"{}\"", schema))
        .await
        .expect("Failed to create test schema");
    admin.close().await.expect("Failed to close admin connection");

    let mut opts = ConnectOptions::new(url);
    opts.max_connections(5)
        .min_connections(1)
        .set_schema_search_path(schema)
        .sqlx_logging(false);
    let db = Database::connect(opts)
        .await
        .expect("Failed to connect to test schema");
    Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");
    db
}

/// Drop the schema a test ran in; tests that skip this leave it behind
pub async fn cleanup_test_db(db: &DatabaseConnection) -> Result<(), DbErr> {
    let row = db
        .query_one(Statement::from_string(
            DbBackend::Postgres,
            "SELECT current_schema() AS schema",
        ))
        .await?;
    if let Some(row) = row {
        let schema: String = row.try_get("", "schema")?;
        if schema.starts_with("test_") {
            db.execute_unprepared(&format!("DROP SCHEMA \"{}\" CASCADE", schema))
                .await?;
        }
    }
    Ok(())
}

pub fn test_config() -> AppConfig {
    let vars: HashMap<&str, &str> = [
        ("DATABASE_URL", "postgresql://localhost/coinfolio_test"),
        ("ADMIN_API_KEY", ADMIN_KEY),
        ("WS_CHANNEL_CAPACITY", "16"),
    ]
    .into_iter()
    .collect();
    AppConfig::from_lookup(|key| vars.get(key).map(|v| v.to_string()))
        .expect("Test config should be valid")
}

/// Price feed stand-in with fixed quotes
pub struct FixedPrices;

#[async_trait]
impl PriceSource for FixedPrices {
    async fn fetch_usd_prices(&self, feed_ids: &[String]) -> Result<HashMap<String, f64>, PriceError> {
        Ok(feed_ids
            .iter()
            .filter_map(|id| match id.as_str() {
                "bitcoin" => Some((id.clone(), 64000.0)),
                "ethereum" => Some((id.clone(), 3000.0)),
                _ => None,
            })
            .collect())
    }
}

pub async fn create_test_state() -> AppState {
    let config = test_config();
    AppState {
        db: setup_test_db().await,
        registry: ConnectionRegistry::new(config.ws_channel_capacity),
        prices: PriceService::new(Arc::new(FixedPrices), Duration::from_secs(60)),
        config: Arc::new(config),
    }
}

pub fn build_test_router(state: AppState) -> Router {
    build_router(state)
}

pub async fn create_user(db: &DatabaseConnection, username: &str) -> users::Model {
    user_service::create_user(
        db,
        NewUser {
            username: username.to_string(),
            email: format!("{}@example.com", username),
            password_hash: "hashed".to_string(),
            is_admin: false,
        },
    )
    .await
    .expect("Failed to create user")
}

/// Seed a balance through the regular deposit path
pub async fn fund(state: &AppState, user_id: i32, currency: &str, amount: Decimal) {
    funding::deposit(
        &state.db,
        &state.registry,
        DepositCommand {
            user_id,
            amount,
            currency: currency.to_string(),
            method: "test".to_string(),
        },
    )
    .await
    .expect("Failed to fund account");
}
