use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::entities::balances;

#[derive(Debug, Deserialize)]
pub struct BalanceQuery {
    pub currency: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BalanceResponse {
    pub currency: String,
    pub balance: Decimal,
}

impl From<balances::Model> for BalanceResponse {
    fn from(model: balances::Model) -> Self {
        Self {
            currency: model.currency,
            balance: model.amount,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BalancesResponse {
    pub balances: Vec<BalanceResponse>,
}
