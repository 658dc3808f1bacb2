//! Shared test harness: in-memory fakes for the three backend
//! collaborators, with call counters and failure injection, plus fixture
//! builders.

// Each integration test binary compiles this module; not every binary uses
// every helper.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use tokio::sync::{broadcast, oneshot};
use uuid::Uuid;

use paleodex_client::backend::{
    AuthGateway, AuthUser, FossilStore, ImageStore, SessionEvent, FOSSIL_IMAGE_BUCKET,
};
use paleodex_client::context::FossilContext;
use paleodex_core::error::CoreError;
use paleodex_core::fossil::{CreateFossil, Fossil, UpdateFossil};
use paleodex_core::query::{FossilQuery, Predicate};
use paleodex_core::types::{FossilId, UserId};
use paleodex_events::ChangeBus;

/// Base URL the fake image store mints public URLs under.
const FAKE_CDN: &str = "https://cdn.test";

// ---------------------------------------------------------------------------
// Fake relational store
// ---------------------------------------------------------------------------

/// In-memory `fossils` table that interprets [`FossilQuery`] values the way
/// the remote store would, with remote-call counters for cache assertions.
#[derive(Default)]
pub struct FakeStore {
    rows: Mutex<Vec<Fossil>>,
    pub count_calls: AtomicUsize,
    pub fetch_calls: AtomicUsize,
    pub fail_reads: AtomicBool,
    /// When set, the next `count` call blocks until the sender fires.
    count_gate: Mutex<Option<oneshot::Receiver<()>>>,
}

impl FakeStore {
    pub fn seed(&self, fossils: Vec<Fossil>) {
        self.rows.lock().unwrap().extend(fossils);
    }

    pub fn row(&self, id: FossilId) -> Option<Fossil> {
        self.rows.lock().unwrap().iter().find(|f| f.id == id).cloned()
    }

    pub fn row_count(&self) -> usize {
        self.rows.lock().unwrap().len()
    }

    /// Total remote calls issued so far (head + data queries).
    pub fn read_calls(&self) -> usize {
        self.count_calls.load(Ordering::SeqCst) + self.fetch_calls.load(Ordering::SeqCst)
    }

    /// Block the next `count` call until the returned sender fires.
    pub fn gate_next_count(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        *self.count_gate.lock().unwrap() = Some(rx);
        tx
    }

    fn matching(&self, query: &FossilQuery) -> Vec<Fossil> {
        let rows = self.rows.lock().unwrap();
        let mut matched: Vec<Fossil> = rows
            .iter()
            .filter(|row| query.predicates.iter().all(|p| matches(row, p)))
            .cloned()
            .collect();
        // Newest first: discovery_date DESC (absent dates last), created_at DESC.
        matched.sort_by(|a, b| {
            (b.discovery_date, b.created_at).cmp(&(a.discovery_date, a.created_at))
        });
        matched
    }
}

fn contains_ci(haystack: Option<&str>, needle: &str) -> bool {
    haystack.is_some_and(|h| h.to_lowercase().contains(&needle.to_lowercase()))
}

fn matches(row: &Fossil, predicate: &Predicate) -> bool {
    match predicate {
        Predicate::SpeciesContains(s) => contains_ci(row.species.as_deref(), s),
        Predicate::LocationContains(s) => contains_ci(row.location.as_deref(), s),
        Predicate::TagsContainAll(required) => {
            let tags = row.tags.as_deref().unwrap_or_default();
            required.iter().all(|t| tags.contains(t))
        }
        Predicate::DiscoveredOnOrAfter(from) => {
            row.discovery_date.is_some_and(|d| d >= *from)
        }
        Predicate::DiscoveredOnOrBefore(to) => {
            row.discovery_date.is_some_and(|d| d <= *to)
        }
        Predicate::OwnedBy(owner) => row.user_id == *owner,
        Predicate::WithId(id) => row.id == *id,
    }
}

#[async_trait]
impl FossilStore for FakeStore {
    async fn count(&self, query: &FossilQuery) -> Result<i64, CoreError> {
        self.count_calls.fetch_add(1, Ordering::SeqCst);
        let gate = self.count_gate.lock().unwrap().take();
        if let Some(rx) = gate {
            let _ = rx.await;
        }
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(CoreError::Backend("connection reset".into()));
        }
        Ok(self.matching(query).len() as i64)
    }

    async fn fetch(&self, query: &FossilQuery) -> Result<Vec<Fossil>, CoreError> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(CoreError::Backend("connection reset".into()));
        }
        let mut matched = self.matching(query);
        if let Some((offset, limit)) = query.range {
            matched = matched
                .into_iter()
                .skip(offset as usize)
                .take(limit as usize)
                .collect();
        }
        Ok(matched)
    }

    async fn insert(
        &self,
        owner: UserId,
        input: &CreateFossil,
        image_url: &str,
    ) -> Result<Fossil, CoreError> {
        let now = Utc::now();
        let fossil = Fossil {
            id: Uuid::new_v4(),
            user_id: owner,
            species: input.species.clone(),
            description: input.description.clone(),
            location: input.location.clone(),
            discovery_date: input.discovery_date,
            tags: input.tags.clone(),
            image_url: image_url.to_string(),
            created_at: now,
            updated_at: now,
        };
        self.rows.lock().unwrap().push(fossil.clone());
        Ok(fossil)
    }

    async fn update(
        &self,
        id: FossilId,
        owner: UserId,
        input: &UpdateFossil,
    ) -> Result<Option<Fossil>, CoreError> {
        let mut rows = self.rows.lock().unwrap();
        // Ownership is part of the predicate: wrong owner matches no row.
        let Some(row) = rows.iter_mut().find(|f| f.id == id && f.user_id == owner) else {
            return Ok(None);
        };
        if let Some(species) = &input.species {
            row.species = Some(species.clone());
        }
        if let Some(description) = &input.description {
            row.description = description.clone();
        }
        if let Some(location) = &input.location {
            row.location = Some(location.clone());
        }
        if let Some(date) = input.discovery_date {
            row.discovery_date = Some(date);
        }
        if let Some(tags) = &input.tags {
            row.tags = Some(tags.clone());
        }
        if let Some(url) = &input.image_url {
            row.image_url = url.clone();
        }
        row.updated_at = Utc::now();
        Ok(Some(row.clone()))
    }

    async fn delete(&self, id: FossilId, owner: UserId) -> Result<bool, CoreError> {
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|f| !(f.id == id && f.user_id == owner));
        Ok(rows.len() < before)
    }
}

// ---------------------------------------------------------------------------
// Fake auth gateway
// ---------------------------------------------------------------------------

pub struct FakeAuth {
    user: Mutex<Option<AuthUser>>,
    sender: broadcast::Sender<SessionEvent>,
}

impl Default for FakeAuth {
    fn default() -> Self {
        let (sender, _) = broadcast::channel(16);
        Self {
            user: Mutex::new(None),
            sender,
        }
    }
}

impl FakeAuth {
    /// Install a session directly, without going through sign-in.
    pub fn set_user(&self, user: Option<AuthUser>) {
        *self.user.lock().unwrap() = user;
    }
}

#[async_trait]
impl AuthGateway for FakeAuth {
    async fn current_user(&self) -> Result<Option<AuthUser>, CoreError> {
        Ok(self.user.lock().unwrap().clone())
    }

    async fn sign_up(&self, email: &str, _password: &str) -> Result<AuthUser, CoreError> {
        let user = AuthUser {
            id: Uuid::new_v4(),
            email: email.to_string(),
        };
        *self.user.lock().unwrap() = Some(user.clone());
        let _ = self.sender.send(SessionEvent::SignedIn(user.clone()));
        Ok(user)
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthUser, CoreError> {
        self.sign_up(email, password).await
    }

    async fn sign_out(&self) -> Result<(), CoreError> {
        *self.user.lock().unwrap() = None;
        let _ = self.sender.send(SessionEvent::SignedOut);
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.sender.subscribe()
    }
}

// ---------------------------------------------------------------------------
// Fake image store
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct FakeImages {
    objects: Mutex<HashMap<String, Vec<u8>>>,
    pub fail_uploads: AtomicBool,
    pub fail_removes: AtomicBool,
}

impl FakeImages {
    pub fn has(&self, path: &str) -> bool {
        self.objects.lock().unwrap().contains_key(path)
    }

    pub fn object_count(&self) -> usize {
        self.objects.lock().unwrap().len()
    }
}

#[async_trait]
impl ImageStore for FakeImages {
    async fn upload(&self, path: &str, bytes: &[u8]) -> Result<(), CoreError> {
        if self.fail_uploads.load(Ordering::SeqCst) {
            return Err(CoreError::Storage("bucket unavailable".into()));
        }
        self.objects
            .lock()
            .unwrap()
            .insert(path.to_string(), bytes.to_vec());
        Ok(())
    }

    fn public_url(&self, path: &str) -> String {
        format!("{FAKE_CDN}/{FOSSIL_IMAGE_BUCKET}/{path}")
    }

    async fn remove(&self, path: &str) -> Result<(), CoreError> {
        if self.fail_removes.load(Ordering::SeqCst) {
            return Err(CoreError::Storage("bucket unavailable".into()));
        }
        self.objects.lock().unwrap().remove(path);
        Ok(())
    }

    fn path_from_url(&self, url: &str) -> Option<String> {
        url.strip_prefix(&format!("{FAKE_CDN}/{FOSSIL_IMAGE_BUCKET}/"))
            .map(str::to_string)
    }
}

// ---------------------------------------------------------------------------
// Harness
// ---------------------------------------------------------------------------

/// Everything a context test needs, wired together.
pub struct Harness {
    pub store: Arc<FakeStore>,
    pub auth: Arc<FakeAuth>,
    pub images: Arc<FakeImages>,
    pub bus: Arc<ChangeBus>,
    pub context: Arc<FossilContext>,
}

impl Harness {
    pub fn new() -> Self {
        init_tracing();
        let store = Arc::new(FakeStore::default());
        let auth = Arc::new(FakeAuth::default());
        let images = Arc::new(FakeImages::default());
        let bus = Arc::new(ChangeBus::default());
        let context = Arc::new(FossilContext::new(
            store.clone(),
            auth.clone(),
            images.clone(),
            bus.clone(),
        ));
        Self {
            store,
            auth,
            images,
            bus,
            context,
        }
    }

    /// Harness with a signed-in user; returns the user for ownership checks.
    pub fn with_user(email: &str) -> (Self, AuthUser) {
        let harness = Self::new();
        let user = AuthUser {
            id: Uuid::new_v4(),
            email: email.to_string(),
        };
        harness.auth.set_user(Some(user.clone()));
        (harness, user)
    }
}

fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// Build a fossil row owned by `owner`.
pub fn fossil(owner: UserId, species: &str, location: &str, description: &str) -> Fossil {
    let now = Utc::now();
    Fossil {
        id: Uuid::new_v4(),
        user_id: owner,
        species: Some(species.to_string()),
        description: description.to_string(),
        location: Some(location.to_string()),
        discovery_date: NaiveDate::from_ymd_opt(2023, 6, 1),
        tags: Some(vec!["paleozoic".to_string()]),
        image_url: format!("{FAKE_CDN}/{FOSSIL_IMAGE_BUCKET}/{owner}/seed.jpg"),
        created_at: now,
        updated_at: now,
    }
}

/// Seed `n` anonymous rows for pagination tests.
pub fn seed_rows(store: &FakeStore, n: usize) {
    let owner = Uuid::new_v4();
    store.seed(
        (0..n)
            .map(|i| {
                let mut row = fossil(owner, "Trilobite", "Utah", &format!("specimen {i}"));
                // Distinct discovery dates keep the newest-first order stable.
                row.discovery_date = NaiveDate::from_ymd_opt(2023, 1, 1)
                    .map(|d| d + chrono::Duration::days(i as i64));
                row
            })
            .collect(),
    );
}
