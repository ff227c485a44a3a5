//! Handlers for tasks, nested under `/projects/{id}/tasks`.
//!
//! Every write runs through [`reconcile`] so status, progress and
//! `completed_at` never disagree, and every dependency list runs through
//! [`link_dependencies`] so only ids of other tasks in the same project are
//! stored.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use renotracker_core::dependencies::link_dependencies;
use renotracker_core::error::CoreError;
use renotracker_core::patch;
use renotracker_core::task_status::{
    reconcile, validate_priority, TaskChange, TaskState, PRIORITY_DEFAULT,
};
use renotracker_core::types::{Date, DbId};
use renotracker_db::models::task::{
    group_board, BoardColumn, CreateTask, MoveTask, SetTaskProgress, Task, TaskListParams,
    TaskRecord, UpdateTask,
};
use renotracker_db::repositories::TaskRepo;

use super::{check_room_ref, clean_text, ensure_project, required_text};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

fn task_not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound { entity: "Task", id })
}

async fn find_task(state: &AppState, project_id: DbId, id: DbId) -> AppResult<Task> {
    TaskRepo::find_by_id(&state.pool, project_id, id)
        .await?
        .ok_or_else(|| task_not_found(id))
}

fn check_date_order(start: Option<Date>, end: Option<Date>) -> AppResult<()> {
    if let (Some(start), Some(end)) = (start, end) {
        if end < start {
            return Err(AppError::Core(CoreError::Validation(format!(
                "End date {end} is before start date {start}"
            ))));
        }
    }
    Ok(())
}

/// Resolve a CSV dependency list against the project's tasks.
///
/// Unknown, self-referential and malformed entries are dropped and logged.
async fn resolve_dependencies(
    state: &AppState,
    project_id: DbId,
    task_id: Option<DbId>,
    csv: &str,
) -> AppResult<Vec<DbId>> {
    let project_tasks = TaskRepo::list_ids(&state.pool, project_id).await?;
    let outcome = link_dependencies(csv, task_id, &project_tasks);
    if !outcome.dropped.is_empty() {
        tracing::warn!(
            project_id,
            task_id = ?task_id,
            dropped = ?outcome.dropped,
            "Dropped invalid task dependencies"
        );
    }
    Ok(outcome.linked.into_iter().collect())
}

fn state_of(task: &Task) -> TaskState {
    TaskState {
        status: task.status,
        progress: task.progress,
        completed_at: task.completed_at,
    }
}

/// POST /api/v1/projects/{id}/tasks
pub async fn create(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(project_id): Path<DbId>,
    Json(input): Json<CreateTask>,
) -> AppResult<(StatusCode, Json<DataResponse<Task>>)> {
    ensure_project(&state.pool, project_id).await?;

    let title = required_text("Task title", &input.title)?;
    let priority = input.priority.unwrap_or(PRIORITY_DEFAULT);
    validate_priority(priority)?;
    check_date_order(input.start_date, input.end_date)?;
    check_room_ref(&state.pool, project_id, input.room_id).await?;

    let task_state = reconcile(
        TaskState::default(),
        TaskChange {
            status: input.status,
            progress: input.progress,
        },
        Utc::now(),
    )?;

    let depends_on = match input.dependencies.as_deref() {
        Some(csv) => Some(resolve_dependencies(&state, project_id, None, csv).await?),
        None => None,
    };

    let record = TaskRecord {
        room_id: input.room_id,
        title,
        description: clean_text(input.description.as_deref()),
        status: task_state.status,
        progress: task_state.progress,
        priority,
        start_date: input.start_date,
        end_date: input.end_date,
        due_date: input.due_date,
        completed_at: task_state.completed_at,
        depends_on,
    };
    let task = TaskRepo::create(&state.pool, project_id, &record).await?;

    tracing::info!(project_id, task_id = task.id, status = %task.status, "Task created");
    Ok((StatusCode::CREATED, Json(DataResponse { data: task })))
}

/// GET /api/v1/projects/{id}/tasks?status=&room_id=
pub async fn list(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(project_id): Path<DbId>,
    Query(params): Query<TaskListParams>,
) -> AppResult<Json<DataResponse<Vec<Task>>>> {
    ensure_project(&state.pool, project_id).await?;
    let tasks = TaskRepo::list(&state.pool, project_id, &params).await?;
    Ok(Json(DataResponse { data: tasks }))
}

/// GET /api/v1/projects/{id}/tasks/board
///
/// One column per status in workflow order; empty columns are included.
pub async fn board(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(project_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<BoardColumn>>>> {
    ensure_project(&state.pool, project_id).await?;
    let tasks = TaskRepo::list(&state.pool, project_id, &TaskListParams::default()).await?;
    Ok(Json(DataResponse {
        data: group_board(tasks),
    }))
}

/// GET /api/v1/projects/{id}/tasks/{task_id}
pub async fn get_by_id(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path((project_id, id)): Path<(DbId, DbId)>,
) -> AppResult<Json<DataResponse<Task>>> {
    let task = find_task(&state, project_id, id).await?;
    Ok(Json(DataResponse { data: task }))
}

/// PUT /api/v1/projects/{id}/tasks/{task_id}
///
/// Absent fields keep their stored value; `null` clears nullable columns.
pub async fn update(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path((project_id, id)): Path<(DbId, DbId)>,
    Json(input): Json<UpdateTask>,
) -> AppResult<Json<DataResponse<Task>>> {
    let current = find_task(&state, project_id, id).await?;

    let title = match input.title.as_deref() {
        Some(title) => required_text("Task title", title)?,
        None => current.title.clone(),
    };
    let priority = input.priority.unwrap_or(current.priority);
    validate_priority(priority)?;

    let start_date = patch::apply(input.start_date, current.start_date);
    let end_date = patch::apply(input.end_date, current.end_date);
    check_date_order(start_date, end_date)?;

    let room_id = patch::apply(input.room_id, current.room_id);
    if room_id != current.room_id {
        check_room_ref(&state.pool, project_id, room_id).await?;
    }

    let task_state = reconcile(
        state_of(&current),
        TaskChange {
            status: input.status,
            progress: input.progress,
        },
        Utc::now(),
    )?;

    let depends_on = match input.dependencies.as_deref() {
        Some(csv) => Some(resolve_dependencies(&state, project_id, Some(id), csv).await?),
        None => None,
    };

    let description = match input.description {
        Some(description) => clean_text(description.as_deref()),
        None => current.description.clone(),
    };

    let record = TaskRecord {
        room_id,
        title,
        description,
        status: task_state.status,
        progress: task_state.progress,
        priority,
        start_date,
        end_date,
        due_date: patch::apply(input.due_date, current.due_date),
        completed_at: task_state.completed_at,
        depends_on,
    };
    let task = TaskRepo::update(&state.pool, project_id, id, &record)
        .await?
        .ok_or_else(|| task_not_found(id))?;
    Ok(Json(DataResponse { data: task }))
}

/// POST /api/v1/projects/{id}/tasks/{task_id}/move
///
/// Kanban drag: sets the status and pulls progress into that status's band.
pub async fn move_task(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path((project_id, id)): Path<(DbId, DbId)>,
    Json(input): Json<MoveTask>,
) -> AppResult<Json<DataResponse<Task>>> {
    let current = find_task(&state, project_id, id).await?;
    let next = reconcile(
        state_of(&current),
        TaskChange {
            status: Some(input.status),
            progress: None,
        },
        Utc::now(),
    )?;

    let task = TaskRepo::update_state(&state.pool, project_id, id, &next)
        .await?
        .ok_or_else(|| task_not_found(id))?;
    tracing::debug!(project_id, task_id = id, from = %current.status, to = %task.status, "Task moved");
    Ok(Json(DataResponse { data: task }))
}

/// PUT /api/v1/projects/{id}/tasks/{task_id}/progress
pub async fn set_progress(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path((project_id, id)): Path<(DbId, DbId)>,
    Json(input): Json<SetTaskProgress>,
) -> AppResult<Json<DataResponse<Task>>> {
    let current = find_task(&state, project_id, id).await?;
    let next = reconcile(
        state_of(&current),
        TaskChange {
            status: None,
            progress: Some(input.progress),
        },
        Utc::now(),
    )?;

    let task = TaskRepo::update_state(&state.pool, project_id, id, &next)
        .await?
        .ok_or_else(|| task_not_found(id))?;
    Ok(Json(DataResponse { data: task }))
}

/// DELETE /api/v1/projects/{id}/tasks/{task_id}
///
/// Removes the task's dependency rows and document links; linked expenses
/// are kept without a task.
pub async fn delete(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path((project_id, id)): Path<(DbId, DbId)>,
) -> AppResult<StatusCode> {
    if TaskRepo::delete(&state.pool, project_id, id).await? {
        tracing::info!(project_id, task_id = id, "Task deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(task_not_found(id))
    }
}
