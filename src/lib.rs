// src/lib.rs

use std::sync::Arc;

use sea_orm::DatabaseConnection;

use config::AppConfig;
use realtime::ConnectionRegistry;
use services::prices::PriceService;

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub config: Arc<AppConfig>,
    pub registry: ConnectionRegistry,
    pub prices: PriceService,
}

pub mod entities {
    pub mod prelude;
    pub mod balances;
    pub mod currencies;
    pub mod deposits;
    pub mod notifications;
    pub mod transfers;
    pub mod users;
    pub mod withdrawals;
}

pub mod services {
    pub mod balance;
    pub mod currency;
    pub mod funding;
    pub mod notification;
    pub mod prices;
    pub mod transfer;
    pub mod users;
}

pub mod app;
pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod logging;
pub mod models;
pub mod realtime;
pub mod utility;
