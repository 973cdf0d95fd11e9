//! USD prices for the supported currencies
//!
//! `PriceService` is built once in `main` and shared through `AppState`.
//! Lookups go through a moka TTL cache keyed by symbol; misses are batched
//! into one request against the configured `PriceSource`.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use moka::future::Cache;
use reqwest::Client;
use sea_orm::ConnectionTrait;
use tracing::{debug, warn};

use crate::error::AppError;
use crate::models::currency::PricesResponse;
use crate::services::balance::DEFAULT_CURRENCY;
use crate::services::currency::list_currencies;

#[derive(Debug, thiserror::Error)]
pub enum PriceError {
    #[error("price request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("price API error {status}: {body}")]
    Status { status: u16, body: String },
}

/// Upstream price feed keyed by feed id (e.g. `bitcoin`)
#[async_trait]
pub trait PriceSource: Send + Sync {
    async fn fetch_usd_prices(&self, feed_ids: &[String]) -> Result<HashMap<String, f64>, PriceError>;
}

pub struct CoinGeckoSource {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl CoinGeckoSource {
    pub fn new(base_url: String, api_key: Option<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        }
    }
}

#[async_trait]
impl PriceSource for CoinGeckoSource {
    async fn fetch_usd_prices(&self, feed_ids: &[String]) -> Result<HashMap<String, f64>, PriceError> {
        if feed_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let url = format!("{}/simple/price", self.base_url);
        let ids = feed_ids.join(",");
        let mut request = self
            .client
            .get(&url)
            .header("accept", "application/json")
            .query(&[("ids", ids.as_str()), ("vs_currencies", "usd")]);
        if let Some(key) = &self.api_key {
            request = request.header("x-cg-demo-api-key", key);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(PriceError::Status { status, body });
        }

        // {"bitcoin": {"usd": 64000.0}, ...}
        let data: HashMap<String, HashMap<String, f64>> = response.json().await?;
        Ok(data
            .into_iter()
            .filter_map(|(id, quotes)| quotes.get("usd").map(|p| (id, *p)))
            .collect())
    }
}

#[derive(Clone)]
pub struct PriceService {
    source: Arc<dyn PriceSource>,
    cache: Cache<String, f64>,
}

impl PriceService {
    pub fn new(source: Arc<dyn PriceSource>, ttl: Duration) -> Self {
        let cache = Cache::builder().max_capacity(1_000).time_to_live(ttl).build();
        Self { source, cache }
    }

    /// Prices for `symbols`, or for every active currency when none are named.
    ///
    /// Unknown symbols and symbols the feed could not price are reported in
    /// `missing`; a failing feed never fails the call.
    pub async fn prices<C: ConnectionTrait>(
        &self,
        conn: &C,
        symbols: Option<&str>,
    ) -> Result<PricesResponse, AppError> {
        let currencies = list_currencies(conn, true).await?;
        let feeds: HashMap<String, Option<String>> = currencies
            .into_iter()
            .map(|c| (c.symbol, c.price_feed_id))
            .collect();

        let requested: Vec<String> = match symbols {
            Some(raw) => {
                let unique: BTreeSet<String> = raw
                    .split(',')
                    .map(|s| s.trim().to_uppercase())
                    .filter(|s| !s.is_empty())
                    .collect();
                unique.into_iter().collect()
            }
            None => {
                let mut all: Vec<String> = feeds.keys().cloned().collect();
                all.sort();
                all
            }
        };

        let mut prices = BTreeMap::new();
        let mut missing = Vec::new();
        let mut to_fetch: Vec<(String, String)> = Vec::new();

        for symbol in requested {
            if symbol == DEFAULT_CURRENCY {
                prices.insert(symbol, 1.0);
                continue;
            }
            match feeds.get(&symbol) {
                Some(Some(feed_id)) => match self.cache.get(&symbol).await {
                    Some(price) => {
                        prices.insert(symbol, price);
                    }
                    None => to_fetch.push((symbol, feed_id.clone())),
                },
                _ => missing.push(symbol),
            }
        }

        if !to_fetch.is_empty() {
            let feed_ids: Vec<String> = to_fetch.iter().map(|(_, id)| id.clone()).collect();
            match self.source.fetch_usd_prices(&feed_ids).await {
                Ok(fetched) => {
                    debug!("Fetched {} of {} prices from feed", fetched.len(), feed_ids.len());
                    for (symbol, feed_id) in to_fetch {
                        match fetched.get(&feed_id) {
                            Some(price) => {
                                self.cache.insert(symbol.clone(), *price).await;
                                prices.insert(symbol, *price);
                            }
                            None => missing.push(symbol),
                        }
                    }
                }
                Err(e) => {
                    warn!("Price feed unavailable: {}", e);
                    missing.extend(to_fetch.into_iter().map(|(symbol, _)| symbol));
                }
            }
        }

        missing.sort();
        Ok(PricesResponse { prices, missing })
    }
}
