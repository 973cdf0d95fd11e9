//! Boundary parsing for loosely-typed JSON request fields

use std::str::FromStr;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::Value;

use crate::error::AppError;

/// Amounts are stored as DECIMAL(20, 8)
pub const MAX_AMOUNT_SCALE: u32 = 8;

/// Largest value a DECIMAL(20, 8) column holds
pub const MAX_AMOUNT: Decimal = dec!(999999999999.99999999);

/// Accepts a JSON number or numeric string; must be positive, at most
/// `MAX_AMOUNT`, with at most eight fractional digits.
pub fn parse_amount(raw: Option<&Value>) -> Result<Decimal, AppError> {
    let value = raw
        .filter(|v| !v.is_null())
        .ok_or_else(|| AppError::InvalidRequest("amount is required".to_string()))?;

    let amount = match value {
        Value::Number(n) => parse_decimal(&n.to_string()),
        Value::String(s) => parse_decimal(s.trim()),
        _ => None,
    }
    .ok_or_else(|| AppError::InvalidRequest("amount must be a number".to_string()))?;

    if amount <= Decimal::ZERO {
        return Err(AppError::InvalidRequest(
            "amount must be greater than zero".to_string(),
        ));
    }

    let amount = amount.normalize();
    if amount.scale() > MAX_AMOUNT_SCALE {
        return Err(AppError::InvalidRequest(format!(
            "amount supports at most {} decimal places",
            MAX_AMOUNT_SCALE
        )));
    }
    if amount > MAX_AMOUNT {
        return Err(AppError::InvalidRequest(format!(
            "amount must not exceed {}",
            MAX_AMOUNT
        )));
    }

    Ok(amount)
}

/// Accepts a positive integer id as a JSON number or numeric string
pub fn parse_id(raw: Option<&Value>, field: &str) -> Result<i32, AppError> {
    let value = raw
        .filter(|v| !v.is_null())
        .ok_or_else(|| AppError::InvalidRequest(format!("{} is required", field)))?;

    let id = match value {
        Value::Number(n) => n.as_i64().and_then(|n| i32::try_from(n).ok()),
        Value::String(s) => s.trim().parse::<i32>().ok(),
        _ => None,
    };

    match id {
        Some(id) if id > 0 => Ok(id),
        _ => Err(AppError::InvalidRequest(format!(
            "{} is not a valid user reference",
            field
        ))),
    }
}

/// Upper-cased currency symbol, defaulting to USD
pub fn parse_currency(raw: Option<&str>) -> Result<String, AppError> {
    let symbol = raw.map(str::trim).filter(|s| !s.is_empty()).unwrap_or("USD");
    if symbol.len() > 10 || !symbol.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(AppError::InvalidRequest(format!(
            "invalid currency symbol {:?}",
            symbol
        )));
    }
    Ok(symbol.to_ascii_uppercase())
}

fn parse_decimal(s: &str) -> Option<Decimal> {
    Decimal::from_str(s)
        .or_else(|_| Decimal::from_scientific(s))
        .ok()
}
