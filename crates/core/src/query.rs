//! The [`FossilQuery`] predicate builder.
//!
//! Read queries against the remote store are described as plain values: a
//! conjunction of [`Predicate`]s, a fixed newest-first ordering, an optional
//! offset/limit range, and an exact-count flag. The store collaborator
//! interprets the value; nothing here performs I/O.

use chrono::NaiveDate;

use crate::filters::SearchFilters;
use crate::types::{FossilId, UserId};

/// A single predicate clause, conjoined with all others on the query.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// Case-insensitive substring match on the species column.
    SpeciesContains(String),
    /// Case-insensitive substring match on the location column.
    LocationContains(String),
    /// The row's tag array must contain every listed tag.
    TagsContainAll(Vec<String>),
    /// `discovery_date >= bound` (inclusive).
    DiscoveredOnOrAfter(NaiveDate),
    /// `discovery_date <= bound` (inclusive).
    DiscoveredOnOrBefore(NaiveDate),
    /// `user_id = owner`.
    OwnedBy(UserId),
    /// `id = fossil_id`.
    WithId(FossilId),
}

/// Result ordering. The catalog always lists newest finds first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Ordering {
    /// `discovery_date DESC, created_at DESC`.
    #[default]
    NewestFirst,
}

/// A value-level description of a read against the `fossils` table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FossilQuery {
    pub predicates: Vec<Predicate>,
    pub ordering: Ordering,
    /// Offset/limit window; `None` fetches the full matching set.
    pub range: Option<(i64, i64)>,
}

impl FossilQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Conjoin one predicate per present, non-empty filter field.
    ///
    /// The free-text query is deliberately ignored here; it is refined
    /// client-side after the fetch. Absent fields are no-ops.
    pub fn with_filters(mut self, filters: &SearchFilters) -> Self {
        if let Some(species) = filters.species.as_deref() {
            if !species.is_empty() {
                self.predicates
                    .push(Predicate::SpeciesContains(species.to_string()));
            }
        }
        if let Some(location) = filters.location.as_deref() {
            if !location.is_empty() {
                self.predicates
                    .push(Predicate::LocationContains(location.to_string()));
            }
        }
        if let Some(tags) = filters.tags.as_deref() {
            if !tags.is_empty() {
                self.predicates.push(Predicate::TagsContainAll(tags.to_vec()));
            }
        }
        if let Some(from) = filters.date_from {
            self.predicates.push(Predicate::DiscoveredOnOrAfter(from));
        }
        if let Some(to) = filters.date_to {
            self.predicates.push(Predicate::DiscoveredOnOrBefore(to));
        }
        self
    }

    /// Restrict the query to rows owned by `user_id`.
    pub fn owned_by(mut self, user_id: UserId) -> Self {
        self.predicates.push(Predicate::OwnedBy(user_id));
        self
    }

    /// Restrict the query to the row with the given id.
    pub fn with_id(mut self, id: FossilId) -> Self {
        self.predicates.push(Predicate::WithId(id));
        self
    }

    /// Apply an offset/limit window.
    pub fn range(mut self, offset: i64, limit: i64) -> Self {
        self.range = Some((offset, limit));
        self
    }
}
