//! Paleodex change-notification infrastructure.
//!
//! Independent list views need to invalidate and refetch after a mutation
//! performed elsewhere. [`ChangeBus`] is the in-process publish/subscribe
//! hub for that, backed by `tokio::sync::broadcast`: listeners register
//! explicitly and receive a typed [`ChangeEvent`] rather than an ambient
//! zero-payload ping. Delivery stays best-effort fan-out.

pub mod bus;

pub use bus::{ChangeBus, ChangeEvent, ChangeKind};
