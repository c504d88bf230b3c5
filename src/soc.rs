//! SOC Code Module
//! Normalizes occupation codes into the canonical `DD-DDDD` form.

/// Canonical code of the "All Occupations" aggregate row.
pub const ALL_OCCUPATIONS: &str = "00-0000";

/// Canonicalize an occupation code.
///
/// Dashes are normalized and whitespace trimmed; a value carrying exactly seven
/// digits is re-formatted as `DD-DDDD`. Anything else is returned as the
/// trimmed input so malformed codes stay visible downstream.
pub fn canonicalize(raw: Option<&str>) -> Option<String> {
    let raw = raw?;
    let cleaned = raw.replace(['\u{2013}', '\u{2014}'], "-");
    let cleaned = cleaned.trim();

    let digits: String = cleaned.chars().filter(char::is_ascii_digit).collect();
    if digits.len() == 7 {
        Some(format!("{}-{}", &digits[..2], &digits[2..]))
    } else {
        Some(cleaned.to_string())
    }
}

/// Canonicalize a code that is known to be present.
pub fn canonical(raw: &str) -> String {
    canonicalize(Some(raw)).unwrap_or_default()
}

/// Whether a canonical code is the all-occupations aggregate.
pub fn is_all_occupations(code: &str) -> bool {
    code == ALL_OCCUPATIONS
}
