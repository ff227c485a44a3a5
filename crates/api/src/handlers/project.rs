//! Handlers for the `/projects` resource.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use renotracker_core::error::CoreError;
use renotracker_core::types::DbId;
use renotracker_db::models::project::{CreateProject, Project, ProjectListParams, UpdateProject};
use renotracker_db::models::user::UserResponse;
use renotracker_db::repositories::{ProjectRepo, UserRepo};

use super::{clean_text, ensure_project, required_text};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Currency codes are stored upper-cased; blank means "use the default".
fn clean_currency(currency: Option<&str>) -> Option<String> {
    clean_text(currency).map(|c| c.to_uppercase())
}

/// POST /api/v1/projects
///
/// The new project becomes the caller's active project.
pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(input): Json<CreateProject>,
) -> AppResult<(StatusCode, Json<DataResponse<Project>>)> {
    let input = CreateProject {
        name: required_text("Project name", &input.name)?,
        description: clean_text(input.description.as_deref()),
        currency: clean_currency(input.currency.as_deref()),
    };
    let project = ProjectRepo::create(&state.pool, &input).await?;
    UserRepo::set_active_project(&state.pool, auth.user_id, Some(project.id)).await?;

    tracing::info!(project_id = project.id, user_id = auth.user_id, "Project created");
    Ok((StatusCode::CREATED, Json(DataResponse { data: project })))
}

/// GET /api/v1/projects?include_archived=
pub async fn list(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(params): Query<ProjectListParams>,
) -> AppResult<Json<DataResponse<Vec<Project>>>> {
    let projects = ProjectRepo::list(&state.pool, params.include_archived).await?;
    Ok(Json(DataResponse { data: projects }))
}

/// GET /api/v1/projects/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Project>>> {
    let project = ensure_project(&state.pool, id).await?;
    Ok(Json(DataResponse { data: project }))
}

/// PUT /api/v1/projects/{id}
pub async fn update(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateProject>,
) -> AppResult<Json<DataResponse<Project>>> {
    let input = UpdateProject {
        name: input
            .name
            .as_deref()
            .map(|n| required_text("Project name", n))
            .transpose()?,
        description: input.description.map(|d| clean_text(d.as_deref())),
        currency: clean_currency(input.currency.as_deref()),
        is_archived: input.is_archived,
    };
    let project = ProjectRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Project",
            id,
        }))?;
    Ok(Json(DataResponse { data: project }))
}

/// DELETE /api/v1/projects/{id}
///
/// Archives the project; its rooms, tasks, expenses and documents are kept.
/// If it was the caller's active project, the newest open project takes over.
pub async fn archive(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    ensure_project(&state.pool, id).await?;
    if ProjectRepo::archive(&state.pool, id).await? {
        tracing::info!(project_id = id, "Project archived");
    }

    let user = UserRepo::find_by_id(&state.pool, auth.user_id).await?;
    if user.and_then(|u| u.active_project_id) == Some(id) {
        let next = ProjectRepo::latest_active(&state.pool).await?.map(|p| p.id);
        UserRepo::set_active_project(&state.pool, auth.user_id, next).await?;
    }

    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/projects/{id}/set-active
pub async fn set_active(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    let project = ensure_project(&state.pool, id).await?;
    if project.is_archived {
        return Err(AppError::Core(CoreError::Validation(
            "Archived projects cannot be made active".into(),
        )));
    }

    let user = UserRepo::set_active_project(&state.pool, auth.user_id, Some(id))
        .await?
        .ok_or_else(|| AppError::Core(CoreError::Unauthorized("Unknown user".into())))?;
    Ok(Json(DataResponse {
        data: UserResponse::from(&user),
    }))
}
