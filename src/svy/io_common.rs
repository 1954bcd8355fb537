// Shared text primitives for the two CSV readers.

use once_cell::sync::Lazy;
use regex::Regex;

static HTML_TAGS: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").unwrap());
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Finds the first of the candidate field names present in a header row.
/// The candidates are in priority order; header whitespace and case are
/// vendor noise.
pub fn first_field_index(headers: &csv::StringRecord, candidates: &[&str]) -> Option<usize> {
    candidates
        .iter()
        .find_map(|c| headers.iter().position(|h| h.trim().eq_ignore_ascii_case(c)))
}

/// Strips HTML tags, collapses internal whitespace and canonicalizes the
/// recognized geo prompts.
pub fn normalize_prompt(raw: &str) -> String {
    let stripped = HTML_TAGS.replace_all(raw, " ");
    let collapsed = WHITESPACE.replace_all(&stripped, " ");
    let text = collapsed.trim();
    match canonical_geo_label(text) {
        Some(label) => label.to_string(),
        None => text.to_string(),
    }
}

/// The geo prompts both vendors emit in a handful of spellings, mapped to a
/// fixed label set so downstream views can group them.
fn canonical_geo_label(text: &str) -> Option<&'static str> {
    match text.to_lowercase().as_str() {
        "zip" | "zipcode" | "zip code" => Some("Zip Code"),
        "postal" | "postalcode" | "postal code" => Some("Postal Code"),
        "zip / postal code" | "zip/postal code" | "zip / postal" | "zip/postal" => {
            Some("Zip / Postal Code")
        }
        _ => None,
    }
}

/// Splits a semicolon-delimited option list, dropping empty entries.
pub fn split_list(raw: &str) -> Vec<String> {
    raw.split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}
