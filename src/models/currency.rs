use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::entities::currencies;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrencyResponse {
    pub symbol: String,
    pub name: String,
    pub is_active: bool,
}

impl From<currencies::Model> for CurrencyResponse {
    fn from(model: currencies::Model) -> Self {
        Self {
            symbol: model.symbol,
            name: model.name,
            is_active: model.is_active,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct PricesQuery {
    /// Comma separated symbols, e.g. `BTC,ETH`
    pub symbols: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricesResponse {
    /// USD price per symbol
    pub prices: BTreeMap<String, f64>,
    /// Requested symbols with no price available right now
    pub missing: Vec<String>,
}
