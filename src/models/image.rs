use serde::{Deserialize, Serialize};

use crate::utils::text::plain_text;

/// Shown in place of an image whose locator is missing
pub const PLACEHOLDER_IMAGE: &str =
    "https://via.placeholder.com/400x180.png?text=Image+Not+Found";

/// One image returned by `/sources` or `/search`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageItem {
    #[serde(default)]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub date_created: String,
    pub url: String,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub confidence: Option<f64>,
}

impl ImageItem {
    /// Confidence used for ordering and averaging (missing counts as 0)
    pub fn confidence_or_zero(&self) -> f64 {
        self.confidence.unwrap_or(0.0)
    }

    /// Image locator, or the placeholder when the backend sent none
    pub fn display_url(&self) -> &str {
        if self.url.trim().is_empty() { PLACEHOLDER_IMAGE } else { &self.url }
    }

    /// Description with markup removed, safe to print to a terminal
    pub fn plain_description(&self) -> Option<String> {
        self.description.as_deref().map(plain_text).filter(|d| !d.is_empty())
    }
}

/// Coarse bucket for a confidence score
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfidenceLevel {
    High,
    Medium,
    Low,
    VeryLow,
}

impl ConfidenceLevel {
    pub fn from_score(score: f64) -> Self {
        let score = clamp_score(score);
        if score >= 0.8 {
            Self::High
        } else if score >= 0.6 {
            Self::Medium
        } else if score >= 0.4 {
            Self::Low
        } else {
            Self::VeryLow
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Low => "Low",
            Self::VeryLow => "Very Low",
        }
    }
}

/// Score clamped to [0, 1] and rounded to a whole percentage
pub fn confidence_percentage(score: f64) -> u8 {
    (clamp_score(score) * 100.0).round() as u8
}

fn clamp_score(score: f64) -> f64 {
    if score.is_nan() { 0.0 } else { score.clamp(0.0, 1.0) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_item_from_backend_json() {
        let json = r#"{
            "title": "Pillars of Creation",
            "description": "<p>Eagle Nebula</p>",
            "url": "https://images.example/pillars.jpg",
            "date_created": "1995-04-01T00:00:00Z",
            "keywords": ["nebula", "hubble"],
            "confidence": 0.92
        }"#;

        let item: ImageItem = serde_json::from_str(json).unwrap();
        assert_eq!(item.title, "Pillars of Creation");
        assert_eq!(item.id, "");
        assert_eq!(item.source, "");
        assert_eq!(item.keywords, vec!["nebula", "hubble"]);
        assert_eq!(item.confidence, Some(0.92));
    }

    #[test]
    fn test_missing_confidence_counts_as_zero() {
        let json = r#"{"id":"1","title":"t","date_created":"2020-01-01","url":"u","source":"nasa"}"#;
        let item: ImageItem = serde_json::from_str(json).unwrap();
        assert!(item.confidence.is_none());
        assert_eq!(item.confidence_or_zero(), 0.0);
    }

    #[test]
    fn test_display_url_placeholder() {
        let json = r#"{"title":"t","date_created":"2020-01-01","url":"  "}"#;
        let item: ImageItem = serde_json::from_str(json).unwrap();
        assert_eq!(item.display_url(), PLACEHOLDER_IMAGE);
    }

    #[test]
    fn test_plain_description_strips_markup() {
        let json = r#"{"title":"t","date_created":"d","url":"u","description":"<b>Mars</b> &amp; moons<script>x</script>"}"#;
        let item: ImageItem = serde_json::from_str(json).unwrap();
        assert_eq!(item.plain_description().as_deref(), Some("Mars & moons"));
    }

    #[test]
    fn test_confidence_levels() {
        assert_eq!(ConfidenceLevel::from_score(0.95), ConfidenceLevel::High);
        assert_eq!(ConfidenceLevel::from_score(0.8), ConfidenceLevel::High);
        assert_eq!(ConfidenceLevel::from_score(0.6), ConfidenceLevel::Medium);
        assert_eq!(ConfidenceLevel::from_score(0.45), ConfidenceLevel::Low);
        assert_eq!(ConfidenceLevel::from_score(0.1), ConfidenceLevel::VeryLow);
        assert_eq!(ConfidenceLevel::from_score(f64::NAN), ConfidenceLevel::VeryLow);
    }

    #[test]
    fn test_confidence_percentage_clamps() {
        assert_eq!(confidence_percentage(0.456), 46);
        assert_eq!(confidence_percentage(1.7), 100);
        assert_eq!(confidence_percentage(-0.2), 0);
    }
}
