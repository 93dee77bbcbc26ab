//! Pure mapping between [`FilterState`] and the address-bar query string.
//!
//! Parameters equal to their default are omitted when building and supplied
//! when parsing, so `parse_query(&build_query(&s)) == s` for every state the
//! reducers can produce.

use crate::model::{SortBy, SortOrder};
use crate::state::{normalize_tag, FilterState, DEFAULT_LIMIT};

/// Parses a query string, with or without the leading `?`.
///
/// Malformed or unknown values fall back to their defaults. When a parameter
/// repeats, the first occurrence wins.
pub fn parse_query(query: &str) -> FilterState {
    let pairs = query_pairs(query);
    let get = |name: &str| first_value(&pairs, name);

    FilterState {
        skip: get("skip").and_then(|v| v.parse().ok()).unwrap_or(0),
        limit: get("limit")
            .and_then(|v| v.parse().ok())
            .filter(|limit| *limit > 0)
            .unwrap_or(DEFAULT_LIMIT),
        sort_by: get("sortBy").map(SortBy::parse).unwrap_or_default(),
        order: get("order").map(SortOrder::parse).unwrap_or_default(),
        search: get("search").unwrap_or_default().to_string(),
        tag: get("tag").map(normalize_tag).unwrap_or_default(),
    }
}

/// Builds the minimal query string for `state`, without a leading `?`.
pub fn build_query(state: &FilterState) -> String {
    let mut pairs: Vec<(&str, String)> = Vec::new();
    if state.skip > 0 {
        pairs.push(("skip", state.skip.to_string()));
    }
    if state.limit != DEFAULT_LIMIT {
        pairs.push(("limit", state.limit.to_string()));
    }
    if !state.search.is_empty() {
        pairs.push(("search", state.search.clone()));
    }
    if state.sort_by != SortBy::None {
        pairs.push(("sortBy", state.sort_by.as_str().to_string()));
    }
    if state.order != SortOrder::Asc {
        pairs.push(("order", state.order.as_str().to_string()));
    }
    if !state.tag.is_empty() {
        pairs.push(("tag", state.tag.clone()));
    }
    // String pairs always serialize
    serde_urlencoded::to_string(&pairs).unwrap_or_default()
}

/// Sets `limit` to `page_size` unless `query` already names a limit.
/// Every other parameter, `skip` included, is kept.
pub fn with_page_size(query: &str, page_size: u64) -> String {
    if first_value(&query_pairs(query), "limit").is_some() {
        return query.strip_prefix('?').unwrap_or(query).to_string();
    }
    let state = parse_query(query);
    build_query(&FilterState {
        limit: page_size.max(1),
        ..state
    })
}

fn query_pairs(query: &str) -> Vec<(String, String)> {
    let query = query.strip_prefix('?').unwrap_or(query);
    match serde_urlencoded::from_str(query) {
        Ok(pairs) => pairs,
        Err(err) => {
            tracing::debug!(query, error = %err, "Unparseable query, using defaults");
            Vec::new()
        }
    }
}

fn first_value<'a>(pairs: &'a [(String, String)], name: &str) -> Option<&'a str> {
    pairs
        .iter()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.as_str())
        .filter(|value| !value.is_empty())
}

/// The form `query` takes after a parse/build cycle. Two queries describing
/// the same state have the same canonical form.
pub fn canonical_query(query: &str) -> String {
    build_query(&parse_query(query))
}
