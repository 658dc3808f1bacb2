//! The fossil data context.
//!
//! [`FossilContext`] composes the predicate builder, the client-side search
//! refiner, the pagination calculator, and the result cache over the three
//! injected collaborators, and exposes the observable state UI consumers
//! render from. All remote calls are async and none is cancelable once
//! issued; instead of letting the last completion win, every fetch takes a
//! monotonically increasing sequence number and completions older than the
//! latest dispatch are discarded without touching shared state.

use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::{Arc, Mutex, RwLock};

use paleodex_core::error::CoreError;
use paleodex_core::filters::SearchFilters;
use paleodex_core::fossil::{CreateFossil, Fossil, UpdateFossil};
use paleodex_core::pagination::{page_range, slice_page};
use paleodex_core::query::FossilQuery;
use paleodex_core::search::refine;
use paleodex_core::types::FossilId;
use paleodex_events::{ChangeBus, ChangeEvent, ChangeKind};

use crate::backend::{image_path, AuthGateway, AuthUser, FossilStore, ImageStore};
use crate::cache::{cache_key, CachedPage, ResultCache};

/// Locally generated message when a user-scoped read has no session.
const LOGIN_REQUIRED: &str = "You must be logged in to view your fossils.";

/// One page of catalog results.
#[derive(Debug, Clone)]
pub struct FossilPage {
    pub fossils: Vec<Fossil>,
    pub total_count: i64,
}

/// Observable context state, cloned out as a snapshot for rendering.
#[derive(Debug, Clone, Default)]
pub struct ContextState {
    pub loading_all: bool,
    pub loading_user: bool,
    pub error_all: Option<String>,
    pub error_user: Option<String>,
    /// Last fetched page of the shared catalog list.
    pub fossils: Vec<Fossil>,
    /// Exact total for the active filter set.
    pub total_count: i64,
    /// Last fetched user-owned list.
    pub user_fossils: Vec<Fossil>,
    /// Serialized filters of the loaded user list; a repeat call with a
    /// byte-identical serialization is a no-op.
    user_loaded_filters: Option<String>,
}

/// Orchestrates catalog reads and mutations against the injected
/// collaborators.
pub struct FossilContext {
    store: Arc<dyn FossilStore>,
    auth: Arc<dyn AuthGateway>,
    images: Arc<dyn ImageStore>,
    bus: Arc<ChangeBus>,
    state: RwLock<ContextState>,
    cache: Mutex<ResultCache>,
    all_seq: AtomicU64,
    user_seq: AtomicU64,
}

impl FossilContext {
    pub fn new(
        store: Arc<dyn FossilStore>,
        auth: Arc<dyn AuthGateway>,
        images: Arc<dyn ImageStore>,
        bus: Arc<ChangeBus>,
    ) -> Self {
        Self {
            store,
            auth,
            images,
            bus,
            state: RwLock::new(ContextState::default()),
            cache: Mutex::new(ResultCache::new()),
            all_seq: AtomicU64::new(0),
            user_seq: AtomicU64::new(0),
        }
    }

    /// A snapshot of the observable state.
    pub fn state(&self) -> ContextState {
        self.state.read().expect("state lock poisoned").clone()
    }

    /// Subscribe to change events published by this context's mutations.
    pub fn subscribe_changes(&self) -> tokio::sync::broadcast::Receiver<ChangeEvent> {
        self.bus.subscribe()
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    /// Fetch one page of the shared catalog list.
    ///
    /// Filter sets without a free-text query are served from the keyed page
    /// cache when possible and written back to it after a fresh fetch. When
    /// a free-text query is active, pagination is recomputed over the fully
    /// refined result set so the returned `total_count` stays correct.
    ///
    /// Failures record a message on `error_all` and are returned to the
    /// caller; state is only written on success.
    pub async fn fetch_all_fossils(
        &self,
        page: i64,
        page_size: i64,
        filters: Option<&SearchFilters>,
    ) -> Result<FossilPage, CoreError> {
        let filters = filters.cloned().unwrap_or_default();
        let has_text = filters.has_search_query();
        let key = cache_key(page, &filters);

        if !has_text {
            let hit = self
                .cache
                .lock()
                .expect("cache lock poisoned")
                .get(&key)
                .cloned();
            if let Some(cached) = hit {
                tracing::debug!(%key, "serving catalog page from cache");
                let mut state = self.state.write().expect("state lock poisoned");
                state.fossils = cached.fossils.clone();
                state.total_count = cached.total_count;
                state.error_all = None;
                return Ok(FossilPage {
                    fossils: cached.fossils,
                    total_count: cached.total_count,
                });
            }
        }

        let ticket = self.all_seq.fetch_add(1, AtomicOrdering::SeqCst) + 1;
        {
            let mut state = self.state.write().expect("state lock poisoned");
            state.loading_all = true;
            state.error_all = None;
        }

        let result = self.fetch_all_inner(page, page_size, &filters).await;
        let latest = ticket == self.all_seq.load(AtomicOrdering::SeqCst);

        match result {
            Ok(fetched) => {
                if latest {
                    let mut state = self.state.write().expect("state lock poisoned");
                    state.loading_all = false;
                    state.fossils = fetched.fossils.clone();
                    state.total_count = fetched.total_count;
                    drop(state);

                    if !has_text {
                        self.cache
                            .lock()
                            .expect("cache lock poisoned")
                            .put(key, CachedPage {
                                fossils: fetched.fossils.clone(),
                                total_count: fetched.total_count,
                            });
                    }
                    tracing::info!(
                        page,
                        total = fetched.total_count,
                        "catalog page fetched"
                    );
                } else {
                    tracing::debug!(ticket, "discarding stale catalog fetch completion");
                }
                Ok(fetched)
            }
            Err(err) => {
                if latest {
                    let mut state = self.state.write().expect("state lock poisoned");
                    state.loading_all = false;
                    state.error_all = Some(err.to_string());
                }
                Err(err)
            }
        }
    }

    /// The remote half of [`fetch_all_fossils`], free of shared state.
    async fn fetch_all_inner(
        &self,
        page: i64,
        page_size: i64,
        filters: &SearchFilters,
    ) -> Result<FossilPage, CoreError> {
        let base = FossilQuery::new().with_filters(&filters.without_search_query());

        let total_count = self.store.count(&base).await?;
        let (offset, limit) = page_range(page, page_size);
        let fossils = self.store.fetch(&base.clone().range(offset, limit)).await?;

        if !filters.has_search_query() {
            return Ok(FossilPage {
                fossils,
                total_count,
            });
        }

        // Free text cannot be pushed to the remote store, so pagination is
        // recomputed over the fully refined set: fetch everything matching
        // the non-text filters, refine, recount, and re-slice.
        let full = self.store.fetch(&base).await?;
        let refined = refine(full, Some(filters));
        let total_count = refined.len() as i64;
        let fossils = slice_page(refined, page, page_size);

        Ok(FossilPage {
            fossils,
            total_count,
        })
    }

    /// Fetch every fossil owned by the current user.
    ///
    /// Without a session this records a locally generated message on
    /// `error_user` and returns without any store call. A repeat call whose
    /// serialized filters are byte-identical to the loaded set is a no-op;
    /// any other call fetches fresh and overwrites the loaded-filters flag.
    pub async fn fetch_user_fossils(
        &self,
        filters: Option<&SearchFilters>,
    ) -> Result<(), CoreError> {
        let user = match self.auth.current_user().await? {
            Some(user) => user,
            None => {
                let mut state = self.state.write().expect("state lock poisoned");
                state.error_user = Some(LOGIN_REQUIRED.to_string());
                return Ok(());
            }
        };

        let filters = filters.cloned().unwrap_or_default();
        let serialized = serde_json::to_string(&filters).unwrap_or_default();
        {
            let state = self.state.read().expect("state lock poisoned");
            if state.user_loaded_filters.as_deref() == Some(serialized.as_str()) {
                tracing::debug!("user list already loaded for this filter set");
                return Ok(());
            }
        }

        let ticket = self.user_seq.fetch_add(1, AtomicOrdering::SeqCst) + 1;
        {
            let mut state = self.state.write().expect("state lock poisoned");
            state.loading_user = true;
            state.error_user = None;
        }

        let query = FossilQuery::new()
            .owned_by(user.id)
            .with_filters(&filters.without_search_query());
        let result = self.store.fetch(&query).await;
        let latest = ticket == self.user_seq.load(AtomicOrdering::SeqCst);

        match result {
            Ok(rows) => {
                if latest {
                    let refined = refine(rows, Some(&filters));
                    let mut state = self.state.write().expect("state lock poisoned");
                    state.loading_user = false;
                    state.user_fossils = refined;
                    state.user_loaded_filters = Some(serialized);
                } else {
                    tracing::debug!(ticket, "discarding stale user fetch completion");
                }
                Ok(())
            }
            Err(err) => {
                if latest {
                    let mut state = self.state.write().expect("state lock poisoned");
                    state.loading_user = false;
                    state.error_user = Some(err.to_string());
                }
                Err(err)
            }
        }
    }

    /// Reset all fetched lists, the keyed page cache, the user-list loaded
    /// flag, and both error strings. Called after every mutation so list
    /// views read fresh.
    pub fn clear_cache(&self) {
        self.cache.lock().expect("cache lock poisoned").clear();
        let mut state = self.state.write().expect("state lock poisoned");
        state.fossils = Vec::new();
        state.total_count = 0;
        state.user_fossils = Vec::new();
        state.user_loaded_filters = None;
        state.error_all = None;
        state.error_user = None;
    }

    // -----------------------------------------------------------------------
    // Mutations
    // -----------------------------------------------------------------------

    /// Create a fossil entry: upload the image, then insert the row.
    ///
    /// A storage failure aborts before any row mutation, so the table never
    /// references a non-existent image.
    pub async fn create_fossil(
        &self,
        input: &CreateFossil,
        image_bytes: &[u8],
        image_ext: &str,
    ) -> Result<Fossil, CoreError> {
        let user = self.require_user("add").await?;

        if input.description.trim().is_empty() {
            return Err(CoreError::Validation("Description is required".into()));
        }

        let path = image_path(user.id, image_ext);
        self.images.upload(&path, image_bytes).await?;
        let image_url = self.images.public_url(&path);

        let fossil = match self.store.insert(user.id, input, &image_url).await {
            Ok(fossil) => fossil,
            Err(err) => {
                // The row never landed; drop the orphaned upload best-effort.
                self.remove_image_best_effort(&path).await;
                return Err(err);
            }
        };

        tracing::info!(fossil_id = %fossil.id, user_id = %user.id, "fossil created");
        self.clear_cache();
        self.bus
            .publish(ChangeEvent::new(ChangeKind::Created).with_fossil(fossil.id));
        Ok(fossil)
    }

    /// Update a fossil, optionally replacing its image.
    ///
    /// Ownership is re-verified inside the store's mutation predicate; a
    /// mismatch mutates nothing and surfaces as `Forbidden`. After a
    /// successful update with a replacement image, the superseded image is
    /// removed best-effort only.
    pub async fn update_fossil(
        &self,
        id: FossilId,
        input: &UpdateFossil,
        new_image: Option<(&[u8], &str)>,
    ) -> Result<Fossil, CoreError> {
        let user = self.require_user("edit").await?;

        let existing = self
            .store
            .fetch(&FossilQuery::new().with_id(id))
            .await?
            .into_iter()
            .next()
            .ok_or(CoreError::NotFound {
                entity: "Fossil",
                id,
            })?;

        let new_path = match new_image {
            Some((bytes, ext)) => {
                let path = image_path(user.id, ext);
                self.images.upload(&path, bytes).await?;
                Some(path)
            }
            None => None,
        };

        let mut patch = input.clone();
        if let Some(path) = new_path.as_deref() {
            patch.image_url = Some(self.images.public_url(path));
        }

        let updated = match self.store.update(id, user.id, &patch).await {
            Ok(Some(updated)) => updated,
            Ok(None) => {
                // Predicate matched no row: not ours. The replacement image
                // is orphaned; drop it best-effort.
                if let Some(path) = new_path.as_deref() {
                    self.remove_image_best_effort(path).await;
                }
                return Err(CoreError::Forbidden(
                    "You can only edit your own fossils".into(),
                ));
            }
            Err(err) => {
                if let Some(path) = new_path.as_deref() {
                    self.remove_image_best_effort(path).await;
                }
                return Err(err);
            }
        };

        if new_path.is_some() {
            if let Some(old_path) = self.images.path_from_url(&existing.image_url) {
                self.remove_image_best_effort(&old_path).await;
            }
        }

        tracing::info!(fossil_id = %id, user_id = %user.id, "fossil updated");
        self.clear_cache();
        self.bus
            .publish(ChangeEvent::new(ChangeKind::Updated).with_fossil(id));
        Ok(updated)
    }

    /// Delete a fossil owned by the current user, then best-effort remove
    /// its stored image.
    pub async fn delete_fossil(&self, id: FossilId) -> Result<(), CoreError> {
        let user = self.require_user("delete").await?;

        let existing = self
            .store
            .fetch(&FossilQuery::new().with_id(id))
            .await?
            .into_iter()
            .next()
            .ok_or(CoreError::NotFound {
                entity: "Fossil",
                id,
            })?;

        if !self.store.delete(id, user.id).await? {
            return Err(CoreError::Forbidden(
                "You can only delete your own fossils".into(),
            ));
        }

        if let Some(path) = self.images.path_from_url(&existing.image_url) {
            self.remove_image_best_effort(&path).await;
        }

        tracing::info!(fossil_id = %id, user_id = %user.id, "fossil deleted");
        self.clear_cache();
        self.bus
            .publish(ChangeEvent::new(ChangeKind::Deleted).with_fossil(id));
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    /// Resolve the current user or fail with a localized message.
    async fn require_user(&self, verb: &str) -> Result<AuthUser, CoreError> {
        self.auth.current_user().await?.ok_or_else(|| {
            CoreError::Unauthorized(format!("You must be logged in to {verb} a fossil"))
        })
    }

    /// Secondary cleanup after a successful primary mutation: failures are
    /// logged and swallowed, never surfaced.
    async fn remove_image_best_effort(&self, path: &str) {
        if let Err(err) = self.images.remove(path).await {
            tracing::warn!(%path, error = %err, "image cleanup failed");
        }
    }
}
