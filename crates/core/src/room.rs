//! Room naming rules.
//!
//! Room names are unique per project, compared case-insensitively. The
//! database enforces the same rule with a unique index on `lower(name)`.

use crate::error::CoreError;

/// Trim a room name, rejecting blank names.
pub fn normalize_room_name(raw: &str) -> Result<String, CoreError> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(CoreError::Validation("Room name must not be empty".into()));
    }
    Ok(name.to_string())
}

/// Key used for uniqueness checks.
pub fn room_name_key(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Build the conflict error reported for a duplicate room name.
pub fn duplicate_room_error(name: &str) -> CoreError {
    CoreError::Conflict(format!("A room named '{name}' already exists in this project"))
}
