//! Utility functions and helpers.

pub mod console;
pub mod http;

use std::sync::OnceLock;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use regex::Regex;
use unicode_segmentation::UnicodeSegmentation;

fn url_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"http\S+|www\S+").expect("static regex"))
}

/// Collapse whitespace, strip URLs and trim.
pub fn clean_text(text: &str) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    let stripped = url_pattern().replace_all(&collapsed, "");
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Reformat a timestamp string with a chrono format pattern.
///
/// Accepts RFC 3339 and a few common layouts; returns the input unchanged
/// when none of them parse.
pub fn format_timestamp(timestamp: &str, format: &str) -> String {
    let timestamp = timestamp.trim();
    if timestamp.is_empty() {
        return String::new();
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(timestamp) {
        return dt.format(format).to_string();
    }
    for layout in ["%Y-%m-%dT%H:%M:%S%.fZ", "%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(timestamp, layout) {
            return dt.format(format).to_string();
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(timestamp, "%Y-%m-%d") {
        if let Some(dt) = date.and_hms_opt(0, 0, 0) {
            return dt.format(format).to_string();
        }
    }

    timestamp.to_string()
}

/// Truncate to at most `max` user-perceived characters.
pub fn truncate_chars(text: &str, max: usize) -> &str {
    match text.grapheme_indices(true).nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_text() {
        assert_eq!(
            clean_text("  great   video https://youtu.be/x  see www.example.com now "),
            "great video see now"
        );
        assert_eq!(clean_text(""), "");
    }

    #[test]
    fn test_format_timestamp() {
        let fmt = "%Y-%m-%d %H:%M:%S";
        assert_eq!(
            format_timestamp("2024-03-05T07:08:09Z", fmt),
            "2024-03-05 07:08:09"
        );
        assert_eq!(
            format_timestamp("2024-03-05T07:08:09.123Z", fmt),
            "2024-03-05 07:08:09"
        );
        assert_eq!(format_timestamp("2024-03-05", fmt), "2024-03-05 00:00:00");
        assert_eq!(format_timestamp("yesterday", fmt), "yesterday");
        assert_eq!(format_timestamp("", fmt), "");
    }

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("abcdefgh", 6), "abcdef");
        assert_eq!(truncate_chars("abc", 6), "abc");
        assert_eq!(truncate_chars("한국어제목입니다", 3), "한국어");
    }
}
