use chrono::Utc;
use sea_orm::prelude::DateTimeWithTimeZone;
use uuid::Uuid;

pub fn now() -> DateTimeWithTimeZone {
    Utc::now().fixed_offset()
}

/// `<PREFIX><unix millis><8 uppercase hex chars>`, e.g. `TXN1767225600000A1B2C3D4`.
///
/// Collisions are treated as negligible; callers do not retry.
pub fn generate_reference(prefix: &str) -> String {
    let suffix = Uuid::new_v4().simple().to_string()[..8].to_uppercase();
    format!("{}{}{}", prefix, Utc::now().timestamp_millis(), suffix)
}

pub fn generate_transaction_id() -> String {
    generate_reference("TXN")
}

/// Public numeric user identifier (9 digits, no leading zero)
pub fn generate_uid() -> String {
    let n = Uuid::new_v4().as_u128() % 900_000_000 + 100_000_000;
    n.to_string()
}
