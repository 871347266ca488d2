//! Image field normalization.
//!
//! The legacy listing store represents "list of image URLs" in at least
//! four incompatible textual encodings: a PostgreSQL array literal
//! (`{url1,url2}`), a JSON array (`["url1","url2"]`), a single bare URL,
//! and free text with an embedded URL. [`normalize_image_field`] converts
//! any of them into one canonical ordered list of validated URLs.
//!
//! Normalization never fails. Malformed legacy values are expected, so
//! every parse attempt degrades to the next one and ultimately to an
//! empty list; degradations are logged at debug level and never
//! propagated as errors.

use std::sync::LazyLock;

use regex::Regex;
use url::Url;

/// Matches an `http(s)://...` substring embedded in free text.
static EMBEDDED_URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"https?://[^\s"'<>)\}\]]+"#).expect("valid regex"));

// ---------------------------------------------------------------------------
// Normalization
// ---------------------------------------------------------------------------

/// Normalize a raw stored image field into an ordered list of validated
/// URLs.
///
/// Parse attempts, in order; each either produces a result or declines:
///
/// 1. `None` / blank input — empty list.
/// 2. `{...}` — PostgreSQL array literal: split on top-level commas,
///    strip surrounding quotes and whitespace, keep valid entries.
/// 3. `[...]` — JSON array: keep string entries that validate as URLs.
///    If the JSON does not parse (or is not an array), the whole string
///    is demoted to a single bare candidate.
/// 4. A bare string that validates as a URL — singleton list.
/// 5. Anything else — best-effort scan for an embedded `http(s)://`
///    substring; singleton if found, otherwise the empty list.
///
/// Duplicates are removed; the order of first appearance is preserved.
pub fn normalize_image_field(raw: Option<&str>) -> Vec<String> {
    let value = match raw {
        Some(v) => v.trim(),
        None => return Vec::new(),
    };
    if value.is_empty() {
        return Vec::new();
    }

    let urls = if value.starts_with('{') && value.ends_with('}') {
        parse_pg_array_literal(value)
    } else if value.starts_with('[') {
        match serde_json::from_str::<serde_json::Value>(value) {
            Ok(serde_json::Value::Array(entries)) => entries
                .iter()
                .filter_map(|e| e.as_str())
                .filter(|s| is_valid_url(s))
                .map(str::to_string)
                .collect(),
            // Not parseable as JSON: treat the whole string as a single
            // bare candidate, same as any other free-form value.
            _ => parse_bare_candidate(value),
        }
    } else {
        parse_bare_candidate(value)
    };

    if urls.is_empty() {
        tracing::debug!(raw = %value, "Image field yielded no valid URLs");
    }

    dedup_preserving_order(urls)
}

/// Serialize a canonical URL list into the single write-back encoding.
///
/// Repaired image fields are always written back as a JSON array: it is
/// the only legacy encoding with an unambiguous grammar, and it
/// round-trips through [`normalize_image_field`] unchanged.
pub fn to_canonical_encoding(urls: &[String]) -> String {
    serde_json::to_string(urls).unwrap_or_else(|_| "[]".to_string())
}

// ---------------------------------------------------------------------------
// Parse attempts
// ---------------------------------------------------------------------------

/// Parse a PostgreSQL array literal (`{a,b,"c"}`) into validated URLs.
///
/// Splits on commas outside double quotes, honours backslash escapes
/// inside quoted entries, and drops entries that are empty or fail URL
/// validation.
fn parse_pg_array_literal(value: &str) -> Vec<String> {
    let inner = &value[1..value.len() - 1];
    if inner.trim().is_empty() {
        return Vec::new();
    }

    let mut entries = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = inner.chars();

    while let Some(c) = chars.next() {
        match c {
            '"' => in_quotes = !in_quotes,
            '\\' if in_quotes => {
                if let Some(escaped) = chars.next() {
                    current.push(escaped);
                }
            }
            ',' if !in_quotes => entries.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    entries.push(current);

    entries
        .iter()
        .map(|e| e.trim())
        .filter(|e| is_valid_url(e))
        .map(str::to_string)
        .collect()
}

/// Treat a free-form value as a single URL candidate.
///
/// A value that validates as-is becomes a singleton; otherwise the value
/// is scanned for an embedded `http(s)://` substring.
fn parse_bare_candidate(value: &str) -> Vec<String> {
    if is_valid_url(value) {
        return vec![value.to_string()];
    }

    EMBEDDED_URL_RE
        .find(value)
        .map(|m| m.as_str())
        .filter(|s| is_valid_url(s))
        .map(|s| vec![s.to_string()])
        .unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// URL-syntax validation: parseable, http(s) scheme, non-empty host.
pub(crate) fn is_valid_url(s: &str) -> bool {
    match Url::parse(s) {
        Ok(url) => {
            (url.scheme() == "http" || url.scheme() == "https")
                && url.host_str().is_some_and(|h| !h.is_empty())
        }
        Err(_) => false,
    }
}

/// Remove duplicates while preserving the order of first appearance.
pub(crate) fn dedup_preserving_order(urls: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    urls.into_iter().filter(|u| seen.insert(u.clone())).collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
