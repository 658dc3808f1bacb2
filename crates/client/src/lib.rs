//! The Paleodex data layer: collaborator seams and the fossil data context.
//!
//! - [`backend`] — injected trait objects for the remote relational store,
//!   the auth provider, and the image object store.
//! - [`config`] — environment-provided backend endpoint configuration.
//! - [`cache`] — the keyed page cache for list reads.
//! - [`context`] — [`FossilContext`](context::FossilContext), the
//!   orchestrator UI consumers observe.

pub mod backend;
pub mod cache;
pub mod config;
pub mod context;

pub use backend::{AuthGateway, AuthUser, FossilStore, ImageStore, SessionEvent};
pub use config::BackendConfig;
pub use context::{ContextState, FossilContext, FossilPage};
