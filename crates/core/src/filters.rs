//! The [`SearchFilters`] value object.
//!
//! Parameterizes reads only; never persisted. The free-text `search_query`
//! field is handled exclusively client-side (see [`crate::search`]) and is
//! stripped before predicate building and cache keying.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Structured filter description for fossil reads.
///
/// Every field is optional; an absent field applies no constraint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchFilters {
    /// Free-text query matched client-side across species, location,
    /// description, and tags.
    pub search_query: Option<String>,
    /// Case-insensitive substring match on the species column.
    pub species: Option<String>,
    /// Case-insensitive substring match on the location column.
    pub location: Option<String>,
    /// The row's tag list must contain every tag listed here.
    pub tags: Option<Vec<String>>,
    /// Inclusive lower bound on the discovery date.
    pub date_from: Option<NaiveDate>,
    /// Inclusive upper bound on the discovery date.
    pub date_to: Option<NaiveDate>,
}

impl SearchFilters {
    /// True when no field constrains anything.
    pub fn is_empty(&self) -> bool {
        !self.has_search_query()
            && self.species.as_deref().map_or(true, str::is_empty)
            && self.location.as_deref().map_or(true, str::is_empty)
            && self.tags.as_deref().map_or(true, <[String]>::is_empty)
            && self.date_from.is_none()
            && self.date_to.is_none()
    }

    /// True when the free-text query is present and non-blank after trimming.
    pub fn has_search_query(&self) -> bool {
        self.search_query
            .as_deref()
            .is_some_and(|q| !q.trim().is_empty())
    }

    /// A copy of these filters with the free-text query stripped.
    ///
    /// Used for predicate building and cache keying, where the free-text
    /// field must never participate.
    pub fn without_search_query(&self) -> SearchFilters {
        SearchFilters {
            search_query: None,
            ..self.clone()
        }
    }

    /// Canonical JSON serialization of the non-text filter fields.
    ///
    /// Struct fields serialize in declaration order, so identical filter
    /// sets always produce identical strings. This is the stable half of
    /// every cache key.
    pub fn canonical(&self) -> String {
        let stripped = self.without_search_query();
        // Serialization of a plain struct with serializable fields cannot fail.
        serde_json::to_string(&stripped).unwrap_or_default()
    }
}
