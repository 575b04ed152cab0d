//! Header lookup over the host's multi-valued header map.
//!
//! # Responsibilities
//! - Resolve one candidate value for a header name
//! - Optionally fall back to a case-insensitive scan
//! - Distinguish "present but empty" from "absent" for logging
//!
//! # Design Decisions
//! - Header maps arrive as JSON from the host, so keys keep whatever casing
//!   the client sent; exact lookup is tried first
//! - Multiple values are joined with `", "`, the same way a proxy folds
//!   repeated headers into one line; empty values keep their slot

use std::collections::HashMap;

/// Header name to ordered values, as forwarded by the host.
pub type HeaderMap = HashMap<String, Vec<String>>;

/// Outcome of a single header lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderLookup {
    /// Header found with at least one non-empty value.
    Found(String),
    /// Exact key present but every value is empty.
    Empty,
    /// No usable header under this name.
    Missing,
}

/// Resolve `key` in `headers`.
///
/// An exact key with only empty values yields [`HeaderLookup::Empty`] and
/// does not trigger the case-insensitive scan.
pub fn resolve(headers: &HeaderMap, key: &str, search_if_absent: bool) -> HeaderLookup {
    if let Some(values) = headers.get(key) {
        return match join_values(values) {
            Some(joined) => HeaderLookup::Found(joined),
            None => HeaderLookup::Empty,
        };
    }

    if search_if_absent {
        let found = headers
            .iter()
            .filter(|(name, _)| name.eq_ignore_ascii_case(key))
            .find_map(|(_, values)| join_values(values));
        if let Some(joined) = found {
            return HeaderLookup::Found(joined);
        }
    }

    HeaderLookup::Missing
}

fn join_values(values: &[String]) -> Option<String> {
    if values.iter().all(String::is_empty) {
        None
    } else {
        Some(values.join(", "))
    }
}
