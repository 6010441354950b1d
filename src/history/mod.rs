//! Locally persisted search history
//!
//! A capped (100), case-insensitively deduplicated, most-recent-first list of
//! past queries with their result count and mean confidence. The list lives in
//! a single key-value slot (`nasa_search_history`):
//!
//! - [`storage::FileStore`]: `<data dir>/nasa_search_history.json`
//! - [`storage::MemoryStore`]: process-local, used by tests and `--ephemeral`

pub mod codec;
pub mod storage;
pub mod store;

pub use storage::{FileStore, KeyValueStore, MemoryStore};
pub use store::{
    HistoryStats, HistoryStore, ITEMS_PER_PAGE, MAX_HISTORY_ITEMS, SEARCH_HISTORY_KEY,
    SharedHistory,
};
