//! Confidence ordering for result lists.

use std::fmt;
use std::str::FromStr;

use crate::models::ImageItem;

/// Ordering applied to a result list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    pub fn toggled(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SortDirection::Asc => "Lowest Confidence",
            SortDirection::Desc => "Highest Confidence",
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortDirection::Asc => write!(f, "asc"),
            SortDirection::Desc => write!(f, "desc"),
        }
    }
}

impl FromStr for SortDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" | "confidence-asc" => Ok(SortDirection::Asc),
            "desc" | "confidence-desc" => Ok(SortDirection::Desc),
            other => Err(format!("unknown sort direction '{}' (expected asc or desc)", other)),
        }
    }
}

/// Sorted copy of `items` by confidence (missing = 0); ties keep their input order
pub fn sort_by_confidence(items: &[ImageItem], direction: SortDirection) -> Vec<ImageItem> {
    let mut sorted = items.to_vec();
    match direction {
        SortDirection::Asc => {
            sorted.sort_by(|a, b| a.confidence_or_zero().total_cmp(&b.confidence_or_zero()))
        }
        SortDirection::Desc => {
            sorted.sort_by(|a, b| b.confidence_or_zero().total_cmp(&a.confidence_or_zero()))
        }
    }
    sorted
}

/// Mean confidence over all items (missing = 0); 0 for an empty list
pub fn average_confidence(items: &[ImageItem]) -> f64 {
    if items.is_empty() {
        return 0.0;
    }
    let total: f64 = items.iter().map(ImageItem::confidence_or_zero).sum();
    total / items.len() as f64
}
