//! Parsing and formatting of record timestamps.
//!
//! The API stores `created_at` as text. Depending on how the row was written
//! it may be RFC 3339, a plain `YYYY-MM-DD HH:MM:SS` string, or an RFC 2822
//! HTTP date. Zoned values are normalised to UTC.

use chrono::{DateTime, NaiveDateTime};

/// Text shown for timestamps that cannot be parsed.
pub const INVALID_DATE: &str = "Invalid Date";

const PLAIN_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S%.f"];

/// Parse a record timestamp.
pub fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc());
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(dt.naive_utc());
    }

    PLAIN_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
}

/// Format as date and time, e.g. "3/5/2024, 10:04:09 AM".
pub fn format_long(ts: &NaiveDateTime) -> String {
    ts.format("%-m/%-d/%Y, %-I:%M:%S %p").to_string()
}

/// Format as a short date, e.g. "Mar 5".
pub fn format_short(ts: &NaiveDateTime) -> String {
    ts.format("%b %-d").to_string()
}

/// Long form of an optional raw timestamp.
pub fn display_long(raw: Option<&str>) -> String {
    raw.and_then(parse_timestamp)
        .map(|ts| format_long(&ts))
        .unwrap_or_else(|| INVALID_DATE.to_string())
}

/// Short form of an optional raw timestamp.
pub fn display_short(raw: Option<&str>) -> String {
    raw.and_then(parse_timestamp)
        .map(|ts| format_short(&ts))
        .unwrap_or_else(|| INVALID_DATE.to_string())
}
