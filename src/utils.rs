//! Utility functions for log truncation and timestamp formatting.

use chrono::{DateTime, Utc};

/// Truncate a string for logging purposes.
///
/// Long strings are cut to at most `max` bytes (on a char boundary) with an
/// ellipsis and the number of dropped bytes appended.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(truncate_for_log("short", 100), "short");
/// assert_eq!(truncate_for_log(&"a".repeat(500), 10), "aaaaaaaaaa…(+490 bytes)");
/// ```
pub fn truncate_for_log(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let mut cut = max;
    while !s.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}…(+{} bytes)", &s[..cut], s.len() - cut)
}

/// Human readable publication time, e.g. `"January 1, 2024 at 10:00 UTC"`.
pub fn display_timestamp(ts: Option<DateTime<Utc>>) -> String {
    match ts {
        Some(ts) => ts.format("%B %-d, %Y at %H:%M UTC").to_string(),
        None => "Unknown date".to_string(),
    }
}

/// Machine readable publication time (RFC 3339), empty when unknown.
pub fn machine_timestamp(ts: Option<DateTime<Utc>>) -> String {
    ts.map(|ts| ts.to_rfc3339_opts(chrono::SecondsFormat::Secs, true))
        .unwrap_or_default()
}
