//! Room entity model and DTOs.

use renotracker_core::patch::double_option;
use renotracker_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A room row from the `rooms` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Room {
    pub id: DbId,
    pub project_id: DbId,
    pub name: String,
    pub floor: Option<String>,
    pub status: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a room.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateRoom {
    pub name: String,
    pub floor: Option<String>,
    pub status: Option<String>,
}

/// DTO for updating a room. `null` clears `floor` / `status`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateRoom {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub floor: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub status: Option<Option<String>>,
}

/// Validated column values written by `RoomRepo`.
#[derive(Debug, Clone)]
pub struct RoomRecord {
    pub name: String,
    pub floor: Option<String>,
    pub status: Option<String>,
}
