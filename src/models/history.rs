use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One past search and its outcome summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchHistoryEntry {
    pub id: String,
    pub query: String,
    #[serde(
        serialize_with = "crate::history::codec::serialize_timestamp",
        deserialize_with = "crate::history::codec::deserialize_timestamp"
    )]
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub results_count: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
}

impl SearchHistoryEntry {
    /// Create an entry stamped with the current time and a fresh id
    pub fn new(query: &str, results_count: Option<usize>, confidence: Option<f64>) -> Self {
        let timestamp = Utc::now();
        Self {
            id: generate_entry_id(&timestamp),
            query: query.to_string(),
            timestamp,
            results_count,
            confidence,
        }
    }
}

/// `<epoch ms>-<9 random chars>`; collisions are unlikely, not impossible
fn generate_entry_id(timestamp: &DateTime<Utc>) -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!("{}-{}", timestamp.timestamp_millis(), &suffix[..9])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_id_format() {
        let entry = SearchHistoryEntry::new("mars", Some(3), Some(0.5));
        let (millis, suffix) = entry.id.split_once('-').unwrap();
        assert_eq!(millis, entry.timestamp.timestamp_millis().to_string());
        assert_eq!(suffix.len(), 9);
    }

    #[test]
    fn test_entry_ids_differ() {
        let a = SearchHistoryEntry::new("mars", None, None);
        let b = SearchHistoryEntry::new("mars", None, None);
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_serializes_camel_case_and_millis() {
        let mut entry = SearchHistoryEntry::new("jupiter", Some(12), None);
        entry.timestamp = DateTime::from_timestamp_millis(1762076480016).unwrap();

        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(value["query"], "jupiter");
        assert_eq!(value["timestamp"], 1762076480016_i64);
        assert_eq!(value["resultsCount"], 12);
        assert!(value.get("confidence").is_none());
    }

    #[test]
    fn test_deserializes_stored_entry() {
        let json = r#"{
            "id": "1762076480016-abc123def",
            "query": "saturn rings",
            "timestamp": 1762076480016,
            "resultsCount": 40,
            "confidence": 0.71
        }"#;

        let entry: SearchHistoryEntry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.query, "saturn rings");
        assert_eq!(entry.results_count, Some(40));
        assert_eq!(entry.confidence, Some(0.71));
        assert_eq!(entry.timestamp, DateTime::from_timestamp_millis(1762076480016).unwrap());
    }
}
