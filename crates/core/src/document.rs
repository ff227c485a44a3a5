//! Document classification, tag normalization, and object-storage keys.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::CoreError;
use crate::types::{DbId, Timestamp};

/// Title used when neither a title nor an original filename is available.
pub const DEFAULT_TITLE: &str = "document";

/// Filename used in storage keys when the upload carried none.
pub const DEFAULT_UPLOAD_NAME: &str = "upload";

// ---------------------------------------------------------------------------
// Document type
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocType {
    #[default]
    Receipt,
    Photo,
    Warranty,
    Paperwork,
    Recipe,
}

impl DocType {
    pub fn as_str(self) -> &'static str {
        match self {
            DocType::Receipt => "receipt",
            DocType::Photo => "photo",
            DocType::Warranty => "warranty",
            DocType::Paperwork => "paperwork",
            DocType::Recipe => "recipe",
        }
    }

    /// Lenient parse for form input: unknown or blank values become `Receipt`.
    pub fn normalize(raw: Option<&str>) -> Self {
        raw.and_then(|s| s.parse().ok()).unwrap_or_default()
    }
}

impl fmt::Display for DocType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "receipt" => Ok(DocType::Receipt),
            "photo" => Ok(DocType::Photo),
            "warranty" => Ok(DocType::Warranty),
            "paperwork" => Ok(DocType::Paperwork),
            "recipe" => Ok(DocType::Recipe),
            other => Err(CoreError::Validation(format!("Unknown document type '{other}'"))),
        }
    }
}

impl TryFrom<String> for DocType {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

// ---------------------------------------------------------------------------
// Photo phase
// ---------------------------------------------------------------------------

/// When a renovation photo was taken relative to the work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PhotoPhase {
    #[default]
    Before,
    During,
    After,
}

impl PhotoPhase {
    pub fn as_str(self) -> &'static str {
        match self {
            PhotoPhase::Before => "before",
            PhotoPhase::During => "during",
            PhotoPhase::After => "after",
        }
    }

    /// Phase to store for a document of `doc_type`.
    ///
    /// Only photos carry a phase; unknown or blank values become `Before`.
    pub fn normalize(doc_type: DocType, raw: Option<&str>) -> Option<Self> {
        if doc_type != DocType::Photo {
            return None;
        }
        Some(raw.and_then(|s| s.parse().ok()).unwrap_or_default())
    }
}

impl FromStr for PhotoPhase {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "before" => Ok(PhotoPhase::Before),
            "during" => Ok(PhotoPhase::During),
            "after" => Ok(PhotoPhase::After),
            other => Err(CoreError::Validation(format!("Unknown photo phase '{other}'"))),
        }
    }
}

impl TryFrom<String> for PhotoPhase {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

// ---------------------------------------------------------------------------
// Tags
// ---------------------------------------------------------------------------

/// Split a free-form tag string (`"Kitchen, plaster;kitchen"`) into tags.
///
/// Blanks are dropped and duplicates are removed case-insensitively, keeping
/// the first spelling seen.
pub fn normalize_tags(raw: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    raw.split([',', ';'])
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .filter(|t| seen.insert(t.to_lowercase()))
        .map(str::to_string)
        .collect()
}

/// Normalize an already-split tag list with the same rules as [`normalize_tags`].
pub fn normalize_tag_list(tags: &[String]) -> Vec<String> {
    normalize_tags(&tags.join(","))
}

// ---------------------------------------------------------------------------
// Titles and storage keys
// ---------------------------------------------------------------------------

/// Pick the display title: explicit title, else original filename, else a default.
pub fn resolve_title(title: Option<&str>, original_filename: Option<&str>) -> String {
    [title, original_filename]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|s| !s.is_empty())
        .unwrap_or(DEFAULT_TITLE)
        .to_string()
}

/// Build the object key for an upload: `{project}/{YYYY-MM}/{uuid}_{filename}`.
///
/// Spaces and path separators in the filename become underscores so the key
/// never gains extra path segments.
pub fn storage_key(
    project_id: DbId,
    original_filename: Option<&str>,
    uploaded_at: Timestamp,
    object_id: Uuid,
) -> String {
    let name = original_filename
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(DEFAULT_UPLOAD_NAME)
        .replace([' ', '/', '\\'], "_");
    format!(
        "{project_id}/{}/{object_id}_{name}",
        uploaded_at.format("%Y-%m")
    )
}
