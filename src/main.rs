use std::sync::Arc;

use anyhow::Context;
use coinfolio_backend::{
    app::build_router,
    config::AppConfig,
    logging::init_logging,
    realtime::ConnectionRegistry,
    services::prices::{CoinGeckoSource, PriceService},
    AppState,
};
use sea_orm::{ConnectOptions, Database};
use sea_orm_migration::MigratorTrait;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env().context("Invalid configuration")?;
    init_logging(&config.log_format);

    // Connect to database
    tracing::info!("Connecting to database...");
    let mut opts = ConnectOptions::new(config.database_url.clone());
    opts.sqlx_logging(false);
    let db = Database::connect(opts)
        .await
        .context("Failed to connect to database")?;

    if config.run_migrations {
        tracing::info!("Running migrations...");
        migration::Migrator::up(&db, None)
            .await
            .context("Failed to run migrations")?;
    }

    let source = CoinGeckoSource::new(
        config.coingecko_api_url.clone(),
        config.coingecko_api_key.clone(),
    );
    let prices = PriceService::new(Arc::new(source), config.price_cache_ttl);
    let registry = ConnectionRegistry::new(config.ws_channel_capacity);

    let state = AppState {
        db,
        config: Arc::new(config.clone()),
        registry: registry.clone(),
        prices,
    };
    let app = build_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_addr))?;
    tracing::info!("Server listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(registry.clone()))
        .await
        .context("Server error")?;

    tracing::info!("Server stopped");
    Ok(())
}

/// Resolves on Ctrl-C or SIGTERM; closes realtime connections so their
/// socket tasks finish and graceful shutdown can complete
async fn shutdown_signal(registry: ConnectionRegistry) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
    registry.close_all();
}
