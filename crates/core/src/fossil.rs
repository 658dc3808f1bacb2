//! Fossil entity and DTOs.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::types::{FossilId, Timestamp, UserId};

// ---------------------------------------------------------------------------
// Entity structs (remote rows)
// ---------------------------------------------------------------------------

/// A row from the remote `fossils` table.
///
/// `description` and `image_url` are always present; every other descriptive
/// field may be absent. A fossil belongs exclusively to the user that created
/// it, and only that user may mutate or delete it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Fossil {
    pub id: FossilId,
    pub user_id: UserId,
    pub species: Option<String>,
    pub description: String,
    pub location: Option<String>,
    pub discovery_date: Option<NaiveDate>,
    pub tags: Option<Vec<String>>,
    /// Public URL of the uploaded image.
    pub image_url: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

// ---------------------------------------------------------------------------
// DTOs (mutation payloads)
// ---------------------------------------------------------------------------

/// DTO for creating a new fossil entry.
///
/// The image is handled separately: it is uploaded to the object store
/// first, and the resulting public URL is attached at insert time.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateFossil {
    pub species: Option<String>,
    pub description: String,
    pub location: Option<String>,
    pub discovery_date: Option<NaiveDate>,
    pub tags: Option<Vec<String>>,
}

/// DTO for updating an existing fossil. Only non-`None` fields are applied.
///
/// `image_url` is set by the data context after a replacement image upload
/// succeeds; callers leave it `None`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateFossil {
    pub species: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub discovery_date: Option<NaiveDate>,
    pub tags: Option<Vec<String>>,
    pub image_url: Option<String>,
}
