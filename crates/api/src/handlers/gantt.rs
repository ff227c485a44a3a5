//! Handler for the Gantt timeline view.

use axum::extract::{Path, State};
use axum::Json;
use chrono::Utc;
use renotracker_core::timeline::{build_gantt, GanttView, TimelineTask};
use renotracker_core::types::DbId;
use renotracker_db::models::task::TaskListParams;
use renotracker_db::repositories::TaskRepo;

use super::ensure_project;
use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/projects/{id}/gantt
///
/// Every task gets a bar: missing dates fall back through the timeline
/// rules, so partially scheduled tasks still render.
pub async fn get_gantt(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(project_id): Path<DbId>,
) -> AppResult<Json<DataResponse<GanttView>>> {
    ensure_project(&state.pool, project_id).await?;

    let tasks = TaskRepo::list(&state.pool, project_id, &TaskListParams::default()).await?;
    let timeline: Vec<TimelineTask> = tasks.iter().map(|t| t.to_timeline()).collect();
    let view = build_gantt(&timeline, Utc::now().date_naive());

    tracing::debug!(
        project_id,
        bars = view.tasks.len(),
        edges = view.edges.len(),
        "Built Gantt view"
    );
    Ok(Json(DataResponse { data: view }))
}
