//! Field parsers.
//!
//! Pure, total functions that turn raw scraped text into typed values. None
//! of them fail: anything that cannot be understood comes back as `None`
//! ("unknown") so that one bad field never aborts the rest of a posting.

use chrono::{DateTime, NaiveDate};
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Thousands-grouped amounts first (`45,000.50`), then plain numbers (`22.5`).
    /// A `k` glued to the number means thousands.
    static ref AMOUNT: Regex =
        Regex::new(r"(?i)(\d{1,3}(?:,\d{3})+(?:\.\d+)?|\d+(?:\.\d+)?)(k\b)?").unwrap();
    static ref ORDINAL: Regex = Regex::new(r"(?i)\b(\d{1,2})(st|nd|rd|th)\b").unwrap();
    static ref DATE_PREFIX: Regex =
        Regex::new(r"(?i)^(date\s+posted|posted\s+on|posted|date)\s*:?\s*").unwrap();
}

/// Date layouts seen on community job boards, tried in order.
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%B %d, %Y",
    "%b %d, %Y",
    "%B %d %Y",
    "%b %d %Y",
    "%d %B %Y",
    "%d %b %Y",
    "%m/%d/%Y",
];

/// Extract a salary from free text.
///
/// Two numeric tokens are treated as a range and averaged; one token is
/// returned as-is; with more than two the first wins. No token at all is
/// `None`, which is distinct from a salary of zero.
pub fn parse_salary(text: &str) -> Option<f64> {
    let amounts: Vec<f64> = AMOUNT
        .captures_iter(text)
        .filter_map(|cap| {
            let digits = cap.get(1)?.as_str().replace(',', "");
            let value: f64 = digits.parse().ok()?;
            Some(if cap.get(2).is_some() { value * 1000.0 } else { value })
        })
        .collect();

    match amounts.as_slice() {
        [] => None,
        [low, high] => Some((low + high) / 2.0),
        [first, ..] => Some(*first),
    }
}

/// Parse a posting date, returning `None` when the text is not a recognizable date.
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    let text = clean_text(text);
    let text = DATE_PREFIX.replace(&text, "");
    let text = ORDINAL.replace_all(&text, "$1");
    let text = text.trim();

    if text.is_empty() {
        return None;
    }

    if let Ok(ts) = DateTime::parse_from_rfc3339(text) {
        return Some(ts.date_naive());
    }

    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
}

/// Collapse whitespace runs to single spaces and trim both ends.
pub fn clean_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Whether the text advertises remote work.
pub fn detect_remote(text: &str) -> bool {
    text.to_lowercase().contains("remote")
}

/// Canonical form of a community name for lookups: lowercase, no whitespace.
///
/// `"Thunder Bay"`, `"thunder bay"` and `" THUNDER   BAY "` all map to `"thunderbay"`.
pub fn normalize_community(name: &str) -> String {
    name.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}
