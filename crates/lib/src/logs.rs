//! Presentation helpers for inference log entries.

use chrono::{DateTime, NaiveDateTime, Utc};

use crate::api::LogEntry;

/// Text for a logged input or output: "None" when absent or empty, strings verbatim,
/// anything else as pretty JSON.
pub fn display_data_item(value: Option<&serde_json::Value>) -> String {
    match value {
        None | Some(serde_json::Value::Null) => "None".to_string(),
        Some(serde_json::Value::String(s)) if s.is_empty() => "None".to_string(),
        Some(serde_json::Value::String(s)) => s.clone(),
        Some(other) => serde_json::to_string_pretty(other).unwrap_or_else(|_| other.to_string()),
    }
}

/// Parse a server timestamp. Naive timestamps are taken as UTC.
pub fn parse_timestamp(ts: &str) -> Option<DateTime<Utc>> {
    if let Ok(t) = DateTime::parse_from_rfc3339(ts) {
        return Some(t.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(ts, fmt).ok())
        .map(|naive| naive.and_utc())
}

/// Coarse "x ago" wording relative to `now`.
pub fn humanize_since(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let secs = (now - then).num_seconds();
    if secs < 0 {
        return "in the future".to_string();
    }
    let ago = |n: i64, one: &str, unit: &str| {
        if n == 1 {
            format!("{} ago", one)
        } else {
            format!("{} {}s ago", n, unit)
        }
    };
    match secs {
        0..=44 => "a few seconds ago".to_string(),
        45..=3_599 => ago((secs / 60).max(1), "a minute", "minute"),
        3_600..=86_399 => ago(secs / 3_600, "an hour", "hour"),
        86_400..=2_591_999 => ago(secs / 86_400, "a day", "day"),
        2_592_000..=31_535_999 => ago(secs / 2_592_000, "a month", "month"),
        _ => ago(secs / 31_536_000, "a year", "year"),
    }
}

/// `2023-07-01 12:00:00 (3 hours ago)`; the raw string when it does not parse.
pub fn format_timestamp(entry: &LogEntry, now: DateTime<Utc>) -> String {
    match parse_timestamp(&entry.ts) {
        Some(t) => format!(
            "{} ({})",
            t.format("%Y-%m-%d %H:%M:%S"),
            humanize_since(t, now)
        ),
        None => entry.ts.clone(),
    }
}

/// [`format_timestamp`] relative to the current time.
pub fn format_entry_time(entry: &LogEntry) -> String {
    format_timestamp(entry, Utc::now())
}
