//! Data models shared by the API client, the search controller and the views.
//!
//! - [`ImageItem`] - An image returned by the backend listing or search
//! - [`SearchHistoryEntry`] - A persisted record of one past search
//! - [`ConfidenceLevel`] - Display bucket for a confidence score
//!
//! Image items are immutable and never persisted; history entries are written
//! through the [`crate::history`] store with custom timestamp (de)serializers.

pub mod history;
pub mod image;

pub use history::SearchHistoryEntry;
pub use image::{ConfidenceLevel, ImageItem, PLACEHOLDER_IMAGE, confidence_percentage};
