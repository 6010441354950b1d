use chrono::{DateTime, Datelike, NaiveDate, Utc};

/// History time with tiered display:
/// - Relative under a week: "2h ago", "3d ago"
/// - Absolute after: "Jan 15", "Dec 3, 2024"
pub fn format_timestamp(timestamp: &DateTime<Utc>) -> String {
    format_timestamp_at(timestamp, &Utc::now())
}

fn format_timestamp_at(timestamp: &DateTime<Utc>, now: &DateTime<Utc>) -> String {
    let elapsed = now.signed_duration_since(*timestamp);

    // Clock skew puts fresh entries slightly in the future
    if elapsed.num_seconds() < 60 {
        return "just now".to_string();
    }
    if elapsed.num_days() >= 7 {
        return if timestamp.year() == now.year() {
            timestamp.format("%b %-d").to_string()
        } else {
            timestamp.format("%b %-d, %Y").to_string()
        };
    }

    match (elapsed.num_days(), elapsed.num_hours(), elapsed.num_minutes()) {
        (d, _, _) if d > 0 => format!("{}d ago", d),
        (_, h, _) if h > 0 => format!("{}h ago", h),
        (_, _, m) => format!("{}m ago", m),
    }
}

/// Backend creation date ("2020-02-18T00:00:00Z" or "2020-02-18") as "Feb 18, 2020"
///
/// Unparseable values are shown verbatim.
pub fn format_date_created(raw: &str) -> String {
    let raw = raw.trim();
    if raw.is_empty() {
        return "Unknown date".to_string();
    }
    parse_date(raw).map(|d| d.format("%b %-d, %Y").to_string()).unwrap_or_else(|| raw.to_string())
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.date_naive());
    }
    // Naive timestamps and plain dates share the leading YYYY-MM-DD
    raw.get(..10).and_then(|head| NaiveDate::parse_from_str(head, "%Y-%m-%d").ok())
}
