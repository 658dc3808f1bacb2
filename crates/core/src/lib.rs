//! Domain types and pure catalog logic for Paleodex.
//!
//! This crate holds everything that does not touch a collaborator:
//!
//! - [`fossil`] — the [`Fossil`](fossil::Fossil) entity and its DTOs.
//! - [`filters`] — the [`SearchFilters`](filters::SearchFilters) value object.
//! - [`query`] — the [`FossilQuery`](query::FossilQuery) predicate builder
//!   consumed by the remote store collaborator.
//! - [`search`] — client-side free-text refinement over fetched rows.
//! - [`pagination`] — offset/limit arithmetic and page counting.
//! - [`error`] — the domain error taxonomy.

pub mod error;
pub mod filters;
pub mod fossil;
pub mod pagination;
pub mod query;
pub mod search;
pub mod types;

pub use error::CoreError;
pub use filters::SearchFilters;
pub use fossil::{CreateFossil, Fossil, UpdateFossil};
pub use query::FossilQuery;
