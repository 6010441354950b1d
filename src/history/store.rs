//! In-memory search history mirrored to a key-value slot.
//!
//! Every mutation rewrites the full list. Storage failures are logged and
//! swallowed: the in-memory list stays authoritative for the session.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use super::codec::{decode_history, encode_history};
use super::storage::KeyValueStore;
use crate::models::SearchHistoryEntry;

/// Storage key for the persisted list
pub const SEARCH_HISTORY_KEY: &str = "nasa_search_history";
/// Maximum number of entries kept
pub const MAX_HISTORY_ITEMS: usize = 100;
/// Entries per page
pub const ITEMS_PER_PAGE: usize = 8;

/// History store shared between the controller and the views
pub type SharedHistory = Arc<Mutex<HistoryStore>>;

/// Aggregate view of the stored history
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryStats {
    pub total: usize,
    pub total_pages: usize,
    pub newest: Option<DateTime<Utc>>,
    pub oldest: Option<DateTime<Utc>>,
    pub mean_confidence: Option<f64>,
}

pub struct HistoryStore {
    storage: Box<dyn KeyValueStore>,
    entries: Vec<SearchHistoryEntry>,
    current_page: usize,
}

impl HistoryStore {
    /// Read the persisted list; missing or corrupt storage yields an empty history
    pub fn load(storage: Box<dyn KeyValueStore>) -> Self {
        let mut entries = match storage.get(SEARCH_HISTORY_KEY) {
            Ok(Some(raw)) => decode_history(&raw).unwrap_or_else(|e| {
                warn!(error = %e, "Failed to load search history");
                Vec::new()
            }),
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!(error = %e, "Failed to read search history");
                Vec::new()
            }
        };

        entries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        entries.truncate(MAX_HISTORY_ITEMS);
        debug!(count = entries.len(), "Loaded search history");

        Self { storage, entries, current_page: 1 }
    }

    /// Wrap into the shared handle injected into consumers
    pub fn into_shared(self) -> SharedHistory {
        Arc::new(Mutex::new(self))
    }

    /// All entries, most recent first
    pub fn entries(&self) -> &[SearchHistoryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Record a query; an existing entry with the same query (ignoring case) moves to the front
    pub fn add(&mut self, query: &str, results_count: Option<usize>, avg_confidence: Option<f64>) {
        let trimmed = query.trim();
        if trimmed.is_empty() {
            return;
        }

        let lowered = trimmed.to_lowercase();
        self.entries.retain(|entry| entry.query.to_lowercase() != lowered);
        self.entries.insert(0, SearchHistoryEntry::new(trimmed, results_count, avg_confidence));
        self.entries.truncate(MAX_HISTORY_ITEMS);

        self.persist();
        self.clamp_page();
    }

    /// Drop the entry with `id`; the list is written back even when nothing matched
    pub fn remove(&mut self, id: &str) {
        self.entries.retain(|entry| entry.id != id);
        self.persist();
        self.clamp_page();
    }

    /// Forget everything and delete the storage slot
    pub fn clear(&mut self) {
        self.entries.clear();
        if let Err(e) = self.storage.remove(SEARCH_HISTORY_KEY) {
            warn!(error = %e, "Failed to clear search history");
        }
        self.clamp_page();
    }

    pub fn stats(&self) -> HistoryStats {
        let confidences: Vec<f64> = self.entries.iter().filter_map(|e| e.confidence).collect();
        let mean_confidence = if confidences.is_empty() {
            None
        } else {
            Some(confidences.iter().sum::<f64>() / confidences.len() as f64)
        };

        HistoryStats {
            total: self.entries.len(),
            total_pages: self.total_pages(),
            newest: self.entries.first().map(|e| e.timestamp),
            oldest: self.entries.last().map(|e| e.timestamp),
            mean_confidence,
        }
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn total_pages(&self) -> usize {
        self.entries.len().div_ceil(ITEMS_PER_PAGE)
    }

    pub fn has_next_page(&self) -> bool {
        self.current_page < self.total_pages()
    }

    pub fn has_prev_page(&self) -> bool {
        self.current_page > 1
    }

    pub fn next_page(&mut self) {
        if self.has_next_page() {
            self.current_page += 1;
        }
    }

    pub fn prev_page(&mut self) {
        if self.has_prev_page() {
            self.current_page -= 1;
        }
    }

    /// Jump to `page` (1-based); out-of-range pages are ignored
    pub fn go_to_page(&mut self, page: usize) {
        if page >= 1 && page <= self.total_pages() {
            self.current_page = page;
        }
    }

    /// Entries on 1-based page `page`
    pub fn page(&self, page: usize) -> &[SearchHistoryEntry] {
        if page == 0 {
            return &[];
        }
        let start = (page - 1).saturating_mul(ITEMS_PER_PAGE);
        if start >= self.entries.len() {
            return &[];
        }
        let end = (start + ITEMS_PER_PAGE).min(self.entries.len());
        &self.entries[start..end]
    }

    /// Entries on the current page
    pub fn current_page_entries(&self) -> &[SearchHistoryEntry] {
        self.page(self.current_page)
    }

    fn clamp_page(&mut self) {
        if self.current_page > self.total_pages().max(1) {
            self.current_page = 1;
        }
    }

    fn persist(&self) {
        let encoded = match encode_history(&self.entries) {
            Ok(encoded) => encoded,
            Err(e) => {
                warn!(error = %e, "Failed to serialize search history");
                return;
            }
        };
        if let Err(e) = self.storage.set(SEARCH_HISTORY_KEY, &encoded) {
            warn!(error = %e, "Failed to save search history");
        }
    }
}

#[cfg(test)]
mod tests {
    use anyhow::bail;

    use super::*;
    use crate::history::storage::MemoryStore;

    struct FailingStore;

    impl KeyValueStore for FailingStore {
        fn get(&self, _key: &str) -> anyhow::Result<Option<String>> {
            bail!("storage unavailable")
        }
        fn set(&self, _key: &str, _value: &str) -> anyhow::Result<()> {
            bail!("quota exceeded")
        }
        fn remove(&self, _key: &str) -> anyhow::Result<()> {
            bail!("storage unavailable")
        }
    }

    fn empty_store() -> (HistoryStore, MemoryStore) {
        let backing = MemoryStore::new();
        (HistoryStore::load(Box::new(backing.clone())), backing)
    }

    #[test]
    fn test_add_ignores_blank_query() {
        let (mut store, backing) = empty_store();
        store.add("   ", Some(1), None);
        assert!(store.is_empty());
        assert_eq!(backing.write_count(), 0);
    }

    #[test]
    fn test_add_trims_and_prepends() {
        let (mut store, _) = empty_store();
        store.add("  mars  ", Some(3), Some(0.5));
        store.add("jupiter", Some(7), None);

        assert_eq!(store.entries()[0].query, "jupiter");
        assert_eq!(store.entries()[1].query, "mars");
        assert_eq!(store.entries()[1].results_count, Some(3));
    }

    #[test]
    fn test_add_dedups_case_insensitively() {
        let (mut store, _) = empty_store();
        store.add("Mars", Some(3), None);
        store.add("venus", Some(1), None);
        let old_id = store.entries()[1].id.clone();

        store.add("mARS", Some(5), None);

        assert_eq!(store.len(), 2);
        assert_eq!(store.entries()[0].query, "mARS");
        assert_eq!(store.entries()[0].results_count, Some(5));
        assert_ne!(store.entries()[0].id, old_id);
    }

    #[test]
    fn test_add_caps_length() {
        let (mut store, _) = empty_store();
        for i in 0..(MAX_HISTORY_ITEMS + 25) {
            store.add(&format!("query {}", i), None, None);
        }
        assert_eq!(store.len(), MAX_HISTORY_ITEMS);
        assert_eq!(store.entries()[0].query, format!("query {}", MAX_HISTORY_ITEMS + 24));
    }

    #[test]
    fn test_persisted_copy_matches_memory() {
        let (mut store, backing) = empty_store();
        store.add("mars", Some(2), Some(0.4));
        store.add("moon", None, None);

        let reloaded = HistoryStore::load(Box::new(backing.clone()));
        assert_eq!(reloaded.entries(), store.entries());
    }

    #[test]
    fn test_clear_removes_slot() {
        let (mut store, backing) = empty_store();
        store.add("mars", None, None);
        store.clear();

        assert!(store.is_empty());
        assert_eq!(backing.get(SEARCH_HISTORY_KEY).unwrap(), None);
    }

    #[test]
    fn test_storage_failures_are_swallowed() {
        let mut store = HistoryStore::load(Box::new(FailingStore));
        assert!(store.is_empty());

        store.add("mars", Some(1), None);
        assert_eq!(store.len(), 1);
        store.remove("nope");
        store.clear();
        assert!(store.is_empty());
    }

    #[test]
    fn test_pagination() {
        let (mut store, _) = empty_store();
        for i in 0..20 {
            store.add(&format!("q{}", i), None, None);
        }

        assert_eq!(store.total_pages(), 3);
        assert_eq!(store.current_page_entries().len(), ITEMS_PER_PAGE);
        assert!(!store.has_prev_page());
        assert!(store.has_next_page());

        store.next_page();
        store.next_page();
        assert_eq!(store.current_page(), 3);
        assert_eq!(store.current_page_entries().len(), 4);

        // Past the end is a no-op
        store.next_page();
        assert_eq!(store.current_page(), 3);

        store.go_to_page(9);
        assert_eq!(store.current_page(), 3);
        store.go_to_page(1);
        assert_eq!(store.current_page(), 1);
        store.prev_page();
        assert_eq!(store.current_page(), 1);

        assert!(store.page(0).is_empty());
        assert!(store.page(4).is_empty());
    }

    #[test]
    fn test_page_resets_when_list_shrinks() {
        let (mut store, _) = empty_store();
        for i in 0..9 {
            store.add(&format!("q{}", i), None, None);
        }
        store.next_page();
        assert_eq!(store.current_page(), 2);

        let last_id = store.entries()[8].id.clone();
        store.remove(&last_id);

        assert_eq!(store.total_pages(), 1);
        assert_eq!(store.current_page(), 1);
    }

    #[test]
    fn test_stats() {
        let (mut store, _) = empty_store();
        assert_eq!(store.stats().total, 0);
        assert_eq!(store.stats().mean_confidence, None);

        store.add("a", Some(1), Some(0.2));
        store.add("b", Some(1), None);
        store.add("c", Some(1), Some(0.6));

        let stats = store.stats();
        assert_eq!(stats.total, 3);
        assert_eq!(stats.total_pages, 1);
        assert!((stats.mean_confidence.unwrap() - 0.4).abs() < 1e-9);
        assert!(stats.newest >= stats.oldest);
    }
}
