//! Output formatting for one-shot commands.
//!
//! Image lists print either as a numbered human-readable listing or as JSON
//! for scripting. Backend text is sanitized before it reaches the terminal.

use serde::Serialize;

use crate::history::{HistoryStats, ITEMS_PER_PAGE};
use crate::models::{ConfidenceLevel, ImageItem, SearchHistoryEntry, confidence_percentage};
use crate::tui::timestamps::{format_date_created, format_timestamp};
use crate::utils::strip_ansi_codes;

/// Maximum characters of description shown per image
const DESCRIPTION_MAX_LEN: usize = 160;

/// JSON envelope for image listings
#[derive(Serialize)]
struct JsonOutput<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    query: Option<&'a str>,
    count: usize,
    average_confidence: f64,
    results: &'a [ImageItem],
}

/// Images as pretty-printed JSON
pub fn format_images_json(query: Option<&str>, items: &[ImageItem], average: f64) -> String {
    let output = JsonOutput { query, count: items.len(), average_confidence: average, results: items };
    serde_json::to_string_pretty(&output).unwrap_or_else(|_| "{}".to_string())
}

/// Numbered listing with confidence level, date and locator
pub fn format_images_human(heading: &str, items: &[ImageItem], average: f64) -> String {
    if items.is_empty() {
        return format!("{}\n\nNo images found.", heading);
    }

    let mut out = format!(
        "{} ({} images, avg confidence {}%)\n",
        heading,
        items.len(),
        confidence_percentage(average)
    );

    for (idx, item) in items.iter().enumerate() {
        out.push('\n');
        out.push_str(&format!(
            "{:>3}. {} {}\n",
            idx + 1,
            confidence_badge(item.confidence),
            strip_ansi_codes(&item.title)
        ));
        out.push_str(&format!("     {}\n", format_date_created(&item.date_created)));
        if let Some(description) = item.plain_description() {
            out.push_str(&format!("     {}\n", truncate_text(&description, DESCRIPTION_MAX_LEN)));
        }
        out.push_str(&format!("     {}\n", strip_ansi_codes(item.display_url())));
    }

    out
}

/// `[High 92%]`, or `[n/a]` when the backend sent no score
pub fn confidence_badge(confidence: Option<f64>) -> String {
    match confidence {
        Some(score) => format!(
            "[{} {}%]",
            ConfidenceLevel::from_score(score).label(),
            confidence_percentage(score)
        ),
        None => "[n/a]".to_string(),
    }
}

/// One page of history
pub fn format_history_page(entries: &[SearchHistoryEntry], page: usize, total_pages: usize) -> String {
    if entries.is_empty() {
        return "No search history.".to_string();
    }

    let mut out = format!("Search history (page {} of {})\n\n", page, total_pages.max(1));
    let offset = (page.saturating_sub(1)) * ITEMS_PER_PAGE;
    for (idx, entry) in entries.iter().enumerate() {
        let results = entry
            .results_count
            .map(|n| format!("{} results", n))
            .unwrap_or_else(|| "-".to_string());
        let confidence = entry
            .confidence
            .map(|c| format!("{}%", confidence_percentage(c)))
            .unwrap_or_else(|| "-".to_string());

        out.push_str(&format!(
            "{:>3}. {:<32} {:>12} {:>5}  {:<10} {}\n",
            offset + idx + 1,
            truncate_text(&strip_ansi_codes(&entry.query), 32),
            results,
            confidence,
            format_timestamp(&entry.timestamp),
            entry.id
        ));
    }
    out
}

pub fn format_stats(stats: &HistoryStats, location: &str) -> String {
    let mut lines = vec![
        "Search History Statistics".to_string(),
        "=========================".to_string(),
        format!("Total searches: {}", stats.total),
        format!("Pages: {}", stats.total_pages),
    ];
    if let Some(mean) = stats.mean_confidence {
        lines.push(format!("Mean confidence: {}%", confidence_percentage(mean)));
    }
    if let Some(newest) = stats.newest {
        lines.push(format!("Newest search: {}", newest.format("%Y-%m-%d %H:%M:%S")));
    }
    if let Some(oldest) = stats.oldest {
        lines.push(format!("Oldest search: {}", oldest.format("%Y-%m-%d %H:%M:%S")));
    }
    lines.push(String::new());
    lines.push(format!("Storage: {}", location));
    lines.join("\n")
}

/// Truncate at a char boundary, adding an ellipsis when shortened
fn truncate_text(text: &str, max_chars: usize) -> String {
    let single_line = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if single_line.chars().count() <= max_chars {
        return single_line;
    }
    let kept: String = single_line.chars().take(max_chars.saturating_sub(1)).collect();
    format!("{}…", kept.trim_end())
}
