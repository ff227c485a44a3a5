//! Request handlers.
//!
//! Each submodule provides async handler functions (create, list, get_by_id,
//! update, delete) for a single resource. Handlers validate input with the
//! rules in `renotracker_core`, delegate to the corresponding repository in
//! `renotracker_db`, and map errors via [`AppError`].

pub mod auth;
pub mod dashboard;
pub mod document;
pub mod expense;
pub mod gantt;
pub mod project;
pub mod room;
pub mod task;

use renotracker_core::error::CoreError;
use renotracker_core::types::DbId;
use renotracker_db::models::project::Project;
use renotracker_db::repositories::{ProjectRepo, RoomRepo, TaskRepo};

use crate::error::{AppError, AppResult};

/// Load a project or fail with 404. Every nested resource goes through this.
pub(crate) async fn ensure_project(pool: &sqlx::PgPool, id: DbId) -> AppResult<Project> {
    ProjectRepo::find_by_id(pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Project",
            id,
        }))
}

/// Reject a room reference that does not name a room in the project.
pub(crate) async fn check_room_ref(
    pool: &sqlx::PgPool,
    project_id: DbId,
    room_id: Option<DbId>,
) -> AppResult<()> {
    if let Some(room_id) = room_id {
        if !RoomRepo::exists(pool, project_id, room_id).await? {
            return Err(AppError::Core(CoreError::Validation(format!(
                "Room {room_id} does not exist in this project"
            ))));
        }
    }
    Ok(())
}

/// Reject a task reference that does not name a task in the project.
pub(crate) async fn check_task_ref(
    pool: &sqlx::PgPool,
    project_id: DbId,
    task_id: Option<DbId>,
) -> AppResult<()> {
    if let Some(task_id) = task_id {
        if !TaskRepo::exists_in_project(pool, project_id, task_id).await? {
            return Err(AppError::Core(CoreError::Validation(format!(
                "Task {task_id} does not exist in this project"
            ))));
        }
    }
    Ok(())
}

/// Trim optional free text, mapping blank values to `None`.
pub(crate) fn clean_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Trim a required text field, rejecting blank values.
pub(crate) fn required_text(field: &str, value: &str) -> AppResult<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(AppError::Core(CoreError::Validation(format!(
            "{field} must not be empty"
        ))));
    }
    Ok(value.to_string())
}
