//! Environment-driven configuration
//!
//! `dotenvy` is loaded by `main` before `AppConfig::from_env` runs, so a
//! local `.env` file behaves the same as exported variables.

use std::env;
use std::time::Duration;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_COINGECKO_URL: &str = "https://api.coingecko.com/api/v3";
const DEFAULT_PRICE_CACHE_TTL_SECS: u64 = 60;
const DEFAULT_WS_CHANNEL_CAPACITY: usize = 64;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{name} has an invalid value {value:?}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub bind_addr: String,
    /// Admin routes reject every request when unset
    pub admin_api_key: Option<String>,
    pub coingecko_api_url: String,
    pub coingecko_api_key: Option<String>,
    pub price_cache_ttl: Duration,
    /// Per-connection outbound buffer for realtime pushes
    pub ws_channel_capacity: usize,
    pub run_migrations: bool,
    pub log_format: LogFormat,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary key lookup; `from_env` passes `std::env`
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let database_url = non_empty("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;

        let price_cache_ttl = Duration::from_secs(parse_or(
            "PRICE_CACHE_TTL_SECS",
            non_empty("PRICE_CACHE_TTL_SECS"),
            DEFAULT_PRICE_CACHE_TTL_SECS,
        )?);

        let ws_channel_capacity = parse_or(
            "WS_CHANNEL_CAPACITY",
            non_empty("WS_CHANNEL_CAPACITY"),
            DEFAULT_WS_CHANNEL_CAPACITY,
        )?;
        if ws_channel_capacity == 0 {
            return Err(ConfigError::Invalid {
                name: "WS_CHANNEL_CAPACITY",
                value: "0".to_string(),
            });
        }

        let run_migrations = parse_or("RUN_MIGRATIONS", non_empty("RUN_MIGRATIONS"), true)?;

        let log_format = match non_empty("LOG_FORMAT").as_deref() {
            None | Some("pretty") | Some("text") => LogFormat::Pretty,
            Some("json") => LogFormat::Json,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    name: "LOG_FORMAT",
                    value: other.to_string(),
                });
            }
        };

        Ok(Self {
            database_url,
            bind_addr: non_empty("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
            admin_api_key: non_empty("ADMIN_API_KEY"),
            coingecko_api_url: non_empty("COINGECKO_API_URL")
                .unwrap_or_else(|| DEFAULT_COINGECKO_URL.to_string()),
            coingecko_api_key: non_empty("COINGECKO_API_KEY"),
            price_cache_ttl,
            ws_channel_capacity,
            run_migrations,
            log_format,
        })
    }
}

fn parse_or<T: std::str::FromStr>(
    name: &'static str,
    raw: Option<String>,
    default: T,
) -> Result<T, ConfigError> {
    match raw {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
    }
}
