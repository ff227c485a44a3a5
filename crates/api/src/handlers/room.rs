//! Handlers for rooms, nested under `/projects/{id}/rooms`.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use renotracker_core::error::CoreError;
use renotracker_core::room::{duplicate_room_error, normalize_room_name};
use renotracker_core::types::DbId;
use renotracker_db::models::room::{CreateRoom, Room, RoomRecord, UpdateRoom};
use renotracker_db::repositories::RoomRepo;

use super::{clean_text, ensure_project};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

fn room_not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound { entity: "Room", id })
}

/// Fail with 409 if another room in the project already uses `name`.
async fn check_name_free(
    state: &AppState,
    project_id: DbId,
    name: &str,
    exclude_id: Option<DbId>,
) -> AppResult<()> {
    if RoomRepo::name_taken(&state.pool, project_id, name, exclude_id).await? {
        return Err(duplicate_room_error(name).into());
    }
    Ok(())
}

/// POST /api/v1/projects/{id}/rooms
pub async fn create(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(project_id): Path<DbId>,
    Json(input): Json<CreateRoom>,
) -> AppResult<(StatusCode, Json<DataResponse<Room>>)> {
    ensure_project(&state.pool, project_id).await?;

    let name = normalize_room_name(&input.name)?;
    check_name_free(&state, project_id, &name, None).await?;

    let record = RoomRecord {
        name,
        floor: clean_text(input.floor.as_deref()),
        status: clean_text(input.status.as_deref()),
    };
    let room = RoomRepo::create(&state.pool, project_id, &record).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: room })))
}

/// GET /api/v1/projects/{id}/rooms
pub async fn list(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(project_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<Room>>>> {
    ensure_project(&state.pool, project_id).await?;
    let rooms = RoomRepo::list(&state.pool, project_id).await?;
    Ok(Json(DataResponse { data: rooms }))
}

/// GET /api/v1/projects/{id}/rooms/{room_id}
pub async fn get_by_id(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path((project_id, id)): Path<(DbId, DbId)>,
) -> AppResult<Json<DataResponse<Room>>> {
    let room = RoomRepo::find_by_id(&state.pool, project_id, id)
        .await?
        .ok_or_else(|| room_not_found(id))?;
    Ok(Json(DataResponse { data: room }))
}

/// PUT /api/v1/projects/{id}/rooms/{room_id}
pub async fn update(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path((project_id, id)): Path<(DbId, DbId)>,
    Json(input): Json<UpdateRoom>,
) -> AppResult<Json<DataResponse<Room>>> {
    let current = RoomRepo::find_by_id(&state.pool, project_id, id)
        .await?
        .ok_or_else(|| room_not_found(id))?;

    let name = match input.name.as_deref() {
        Some(raw) => {
            let name = normalize_room_name(raw)?;
            check_name_free(&state, project_id, &name, Some(id)).await?;
            name
        }
        None => current.name,
    };

    let record = RoomRecord {
        name,
        floor: match input.floor {
            Some(floor) => clean_text(floor.as_deref()),
            None => current.floor,
        },
        status: match input.status {
            Some(status) => clean_text(status.as_deref()),
            None => current.status,
        },
    };
    let room = RoomRepo::update(&state.pool, project_id, id, &record)
        .await?
        .ok_or_else(|| room_not_found(id))?;
    Ok(Json(DataResponse { data: room }))
}

/// DELETE /api/v1/projects/{id}/rooms/{room_id}
///
/// Tasks, expenses and documents in the room are kept and lose their room.
pub async fn delete(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path((project_id, id)): Path<(DbId, DbId)>,
) -> AppResult<StatusCode> {
    if RoomRepo::delete(&state.pool, project_id, id).await? {
        tracing::info!(project_id, room_id = id, "Room deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(room_not_found(id))
    }
}
