//! Collaborator traits for the remote backend.
//!
//! The hosted relational store, the auth provider, and the image object
//! store are external services. They enter the data layer as explicitly
//! constructed, injected trait objects so tests can substitute in-memory
//! fakes; there is no global client singleton.

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::broadcast;

use paleodex_core::error::CoreError;
use paleodex_core::fossil::{CreateFossil, Fossil, UpdateFossil};
use paleodex_core::query::FossilQuery;
use paleodex_core::types::{FossilId, UserId};

/// Bucket holding uploaded fossil images.
pub const FOSSIL_IMAGE_BUCKET: &str = "fossil-images";

// ---------------------------------------------------------------------------
// Relational store
// ---------------------------------------------------------------------------

/// Read/write access to the remote `fossils` table.
///
/// Mutations carry the acting user's id so ownership is re-verified inside
/// the mutation predicate, not merely client-side.
#[async_trait]
pub trait FossilStore: Send + Sync {
    /// Exact row count for the query (range ignored).
    async fn count(&self, query: &FossilQuery) -> Result<i64, CoreError>;

    /// Fetch rows matching the query, ordered and ranged as described.
    async fn fetch(&self, query: &FossilQuery) -> Result<Vec<Fossil>, CoreError>;

    /// Insert a new row owned by `owner`, returning the created row.
    async fn insert(
        &self,
        owner: UserId,
        input: &CreateFossil,
        image_url: &str,
    ) -> Result<Fossil, CoreError>;

    /// Update the row with `id` if and only if it is owned by `owner`.
    ///
    /// Returns `None` when the id+owner predicate matched no row (the row
    /// does not exist or belongs to someone else); nothing is mutated then.
    async fn update(
        &self,
        id: FossilId,
        owner: UserId,
        input: &UpdateFossil,
    ) -> Result<Option<Fossil>, CoreError>;

    /// Delete the row with `id` if owned by `owner`. True if a row went away.
    async fn delete(&self, id: FossilId, owner: UserId) -> Result<bool, CoreError>;
}

// ---------------------------------------------------------------------------
// Auth provider
// ---------------------------------------------------------------------------

/// A signed-in user as reported by the auth provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub id: UserId,
    pub email: String,
}

/// Session lifecycle notification.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    SignedIn(AuthUser),
    SignedOut,
}

/// The remote authentication provider.
#[async_trait]
pub trait AuthGateway: Send + Sync {
    /// The current session's user, if any.
    async fn current_user(&self) -> Result<Option<AuthUser>, CoreError>;

    async fn sign_up(&self, email: &str, password: &str) -> Result<AuthUser, CoreError>;

    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthUser, CoreError>;

    async fn sign_out(&self) -> Result<(), CoreError>;

    /// Subscribe to session-change notifications.
    fn subscribe(&self) -> broadcast::Receiver<SessionEvent>;
}

// ---------------------------------------------------------------------------
// Object store
// ---------------------------------------------------------------------------

/// Bucket-scoped image storage.
#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Upload `bytes` to `path` within the fossil image bucket.
    async fn upload(&self, path: &str, bytes: &[u8]) -> Result<(), CoreError>;

    /// Public URL for a stored path.
    fn public_url(&self, path: &str) -> String;

    /// Delete the object at `path`.
    async fn remove(&self, path: &str) -> Result<(), CoreError>;

    /// Recover the bucket-relative path from a public URL produced by
    /// [`public_url`](Self::public_url). `None` for foreign URLs.
    fn path_from_url(&self, url: &str) -> Option<String>;
}

/// Build a collision-free storage path for a new image upload.
///
/// Paths are namespaced by the owning user and stamped with the current
/// time in milliseconds: `{user_id}/{unix_millis}.{ext}`.
pub fn image_path(owner: UserId, ext: &str) -> String {
    format!("{owner}/{}.{ext}", Utc::now().timestamp_millis())
}
