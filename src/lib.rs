//! Space Explorer - Browse and search a gallery of space images
//!
//! This library is the client side of an image backend exposing `/sources`,
//! `/search` and `/ping`. It supports:
//!
//! - Typed HTTP access with user-facing error messages ([`api`])
//! - A debounced, retrying search session that records successful queries ([`search`])
//! - A capped, deduplicated, paginated search history persisted as JSON ([`history`])
//! - Confidence ordering of result lists ([`search::sort`])
//! - A terminal gallery ([`tui`]) and one-shot commands ([`cli`])
//!
//! # Example
//!
//! ```no_run
//! use space_explorer::{ApiClient, HistoryStore, MemoryStore, SearchConfig, SearchController, SearchStatus};
//!
//! # async fn demo() -> anyhow::Result<()> {
//! let api = ApiClient::new("http://localhost:8000/api/v1")?;
//! let history = HistoryStore::load(Box::new(MemoryStore::new())).into_shared();
//!
//! let mut controller = SearchController::new(api, Some(history), SearchConfig::default());
//! let mut session = controller.subscribe();
//! controller.set_query("andromeda");
//!
//! let settled = session
//!     .wait_for(|s| matches!(s.status, SearchStatus::Succeeded | SearchStatus::Failed))
//!     .await?;
//! println!("{} images", settled.results.len());
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod cli;
pub mod clipboard;
pub mod history;
pub mod models;
pub mod search;
pub mod tui;
pub mod utils;

// Re-export commonly used types
pub use api::{ApiClient, HttpClient, HttpError, ImageApi, message_for};
pub use clipboard::copy_to_clipboard;
pub use history::{FileStore, HistoryStore, MemoryStore, SharedHistory};
pub use models::{ImageItem, SearchHistoryEntry};
pub use search::{
    SearchConfig, SearchController, SearchSession, SearchStatus, SortDirection,
    average_confidence, sort_by_confidence,
};
