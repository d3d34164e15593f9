use rust_decimal::Decimal;
use serde::{de, Deserialize, Deserializer};
use serde_json::Value;

use crate::types::UserId;

/// Columns the DB export must carry, in export order.
pub const DB_COLUMNS: [&str; 7] = ["id", "user_id", "account_number", "amount", "transaction_type", "date", "location"];

/// A single element of the API payload array.
///
/// Every field is optional: the payload is only validated as a top-level array, so absent
/// or null keys simply map to `None`. Unknown keys (the API echoes its own `source`) are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiRecord {
    #[serde(default, deserialize_with = "lenient_string")]
    pub transaction_id: Option<String>,
    #[serde(default)]
    pub user_id: Option<UserId>,
    #[serde(default)]
    pub amount: Option<Decimal>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub merchant: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    /// ISO-8601 event timestamp.
    #[serde(default)]
    pub timestamp: Option<String>
}

/// A single row of the DB export CSV.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DbRecord {
    pub id: Option<String>,
    pub user_id: Option<UserId>,
    pub account_number: Option<String>,
    /// Parsed from the exported text, so no precision is lost.
    #[serde(with = "rust_decimal::serde::str_option")]
    pub amount: Option<Decimal>,
    pub transaction_type: Option<String>,
    /// Local date-time, e.g. `2025-11-03 08:15:00`.
    pub date: Option<String>,
    pub location: Option<String>
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(value)) => Ok(Some(value)),
        Some(Value::Number(value)) => Ok(Some(value.to_string())),
        Some(other) => Err(de::Error::custom(format!("expected a string or number identifier, found {other}")))
    }
}
