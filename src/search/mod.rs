//! Search pipeline: the debounced controller and result ordering
//!
//! - [`controller`]: query state machine with debounce, retry and history recording
//! - [`sort`]: confidence ordering and averaging over result lists

pub mod controller;
pub mod sort;

pub use controller::{
    SearchConfig, SearchController, SearchNotice, SearchSession, SearchStatus,
};
pub use sort::{SortDirection, average_confidence, sort_by_confidence};
