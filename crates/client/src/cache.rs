//! Keyed page cache for list reads.
//!
//! Entries map a page number plus a canonical serialization of the active
//! non-text filters to a previously fetched page, avoiding redundant remote
//! round-trips for repeated navigation. Free-text results are never cached:
//! their counts are data-dependent and do not compose with offset
//! pagination. No eviction beyond a full clear; entries live for the
//! lifetime of the owning context.

use std::collections::HashMap;

use paleodex_core::filters::SearchFilters;
use paleodex_core::fossil::Fossil;

/// One cached page of results plus its exact total count.
#[derive(Debug, Clone)]
pub struct CachedPage {
    pub fossils: Vec<Fossil>,
    pub total_count: i64,
}

/// Deterministic cache key for a (page, filters) pair.
///
/// The filter half uses [`SearchFilters::canonical`], so identical filter
/// sets always produce identical keys regardless of how they were built.
pub fn cache_key(page: i64, filters: &SearchFilters) -> String {
    format!("{page}|{}", filters.canonical())
}

/// In-memory map from cache key to fetched page.
#[derive(Debug, Default)]
pub struct ResultCache {
    entries: HashMap<String, CachedPage>,
}

impl ResultCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&CachedPage> {
        self.entries.get(key)
    }

    pub fn put(&mut self, key: String, page: CachedPage) {
        self.entries.insert(key, page);
    }

    /// Drop every entry. Mutations invalidate wholesale, not selectively.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
