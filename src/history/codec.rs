//! JSON encoding of the persisted history list.
//!
//! Decoding is lenient in the same way at two levels: a malformed entry is
//! logged and skipped, while a payload that is not an array, or where more
//! than half the entries fail, is rejected as a whole so the caller can fall
//! back to an empty history.

use anyhow::{Result, bail};
use chrono::{DateTime, Utc};
use serde::de::Error;
use serde::{Deserialize, Deserializer, Serializer};
use serde_json::Value;
use tracing::warn;

use crate::models::SearchHistoryEntry;

/// Timestamps are stored as epoch milliseconds
pub fn serialize_timestamp<S>(timestamp: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_i64(timestamp.timestamp_millis())
}

/// Accepts epoch milliseconds or an RFC3339 string
pub fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    match value {
        Value::Number(n) => {
            // Browsers store fractional milliseconds occasionally
            let ms = n
                .as_i64()
                .or_else(|| n.as_f64().map(|f| f as i64))
                .ok_or_else(|| Error::custom("invalid timestamp"))?;
            DateTime::from_timestamp_millis(ms)
                .ok_or_else(|| Error::custom("timestamp out of range"))
        }
        Value::String(s) => s
            .parse::<DateTime<Utc>>()
            .map_err(|e| Error::custom(format!("invalid RFC3339 timestamp: {}", e))),
        _ => Err(Error::custom("timestamp must be a number or string")),
    }
}

/// Decode a stored history payload, skipping malformed entries
pub fn decode_history(raw: &str) -> Result<Vec<SearchHistoryEntry>> {
    let value: Value = serde_json::from_str(raw)?;
    let Value::Array(items) = value else {
        bail!("history payload is not a JSON array");
    };

    let total = items.len();
    let mut entries = Vec::with_capacity(total);
    let mut skipped = 0;

    for (idx, item) in items.into_iter().enumerate() {
        match serde_json::from_value::<SearchHistoryEntry>(item) {
            Ok(entry) if !entry.query.trim().is_empty() => entries.push(entry),
            Ok(_) => {
                warn!(index = idx, "Skipping history entry with empty query");
                skipped += 1;
            }
            Err(e) => {
                warn!(index = idx, error = %e, "Skipping malformed history entry");
                skipped += 1;
            }
        }
    }

    if total > 0 && skipped * 2 > total {
        bail!("Too many malformed history entries: {} of {} failed", skipped, total);
    }

    Ok(entries)
}

/// Encode the full history list for storage
pub fn encode_history(entries: &[SearchHistoryEntry]) -> Result<String> {
    Ok(serde_json::to_string(entries)?)
}
