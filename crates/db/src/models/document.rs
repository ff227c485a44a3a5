//! Document entity model and DTOs.
//!
//! Document bytes live in the object store; this table only holds metadata
//! and the object's `storage_key`.

use renotracker_core::document::{DocType, PhotoPhase};
use renotracker_core::patch::double_option;
use renotracker_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A document row from the `documents` table, with its task and expense links.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Document {
    pub id: DbId,
    pub project_id: DbId,
    pub room_id: Option<DbId>,
    #[sqlx(try_from = "String")]
    pub doc_type: DocType,
    /// `before` / `during` / `after`; only set for photos.
    pub photo_group: Option<String>,
    pub title: String,
    pub notes: Option<String>,
    pub tags: Vec<String>,
    pub original_filename: Option<String>,
    pub content_type: Option<String>,
    pub size_bytes: Option<i64>,
    #[serde(skip_serializing)]
    pub storage_key: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub task_ids: Vec<DbId>,
    pub expense_ids: Vec<DbId>,
}

/// DTO for updating document metadata. The stored object is never replaced.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateDocument {
    pub title: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub notes: Option<Option<String>>,
    pub doc_type: Option<String>,
    pub photo_group: Option<String>,
    pub tags: Option<Vec<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub room_id: Option<Option<DbId>>,
    pub task_ids: Option<Vec<DbId>>,
    pub expense_ids: Option<Vec<DbId>>,
}

/// Query parameters for listing documents.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DocumentListParams {
    pub tag: Option<String>,
    pub doc_type: Option<String>,
    pub photo_group: Option<String>,
}

/// Validated metadata written by `DocumentRepo`.
#[derive(Debug, Clone)]
pub struct DocumentRecord {
    pub room_id: Option<DbId>,
    pub doc_type: DocType,
    pub photo_group: Option<PhotoPhase>,
    pub title: String,
    pub notes: Option<String>,
    pub tags: Vec<String>,
    /// `None` leaves the stored links untouched on update.
    pub task_ids: Option<Vec<DbId>>,
    pub expense_ids: Option<Vec<DbId>>,
}

/// Properties of the uploaded object, fixed at creation.
#[derive(Debug, Clone)]
pub struct StoredObject {
    pub storage_key: String,
    pub original_filename: Option<String>,
    pub content_type: Option<String>,
    pub size_bytes: i64,
}
