//! Client-side free-text refinement.
//!
//! The remote store cannot combine a fuzzy match across species, location,
//! a long free-form description, and a tag array in one cheap round trip,
//! so the free-text query is applied here against already-fetched rows.

use crate::filters::SearchFilters;
use crate::fossil::Fossil;

/// Refine `fossils` by the filters' free-text query.
///
/// Returns the input unchanged when the query is absent or blank. Otherwise
/// keeps rows whose species, location, description, or any tag contains the
/// query case-insensitively, preserving relative order.
pub fn refine(fossils: Vec<Fossil>, filters: Option<&SearchFilters>) -> Vec<Fossil> {
    let query = match filters {
        Some(f) if f.has_search_query() => f
            .search_query
            .as_deref()
            .map(|q| q.trim().to_lowercase())
            .unwrap_or_default(),
        _ => return fossils,
    };

    fossils
        .into_iter()
        .filter(|fossil| matches_query(fossil, &query))
        .collect()
}

/// True when any searchable field of `fossil` contains `query`.
///
/// `query` must already be trimmed and lowercased.
fn matches_query(fossil: &Fossil, query: &str) -> bool {
    let field_contains = |field: Option<&str>| {
        field.is_some_and(|value| value.to_lowercase().contains(query))
    };

    field_contains(fossil.species.as_deref())
        || field_contains(fossil.location.as_deref())
        || fossil.description.to_lowercase().contains(query)
        || fossil
            .tags
            .as_deref()
            .unwrap_or_default()
            .iter()
            .any(|tag| tag.to_lowercase().contains(query))
}
