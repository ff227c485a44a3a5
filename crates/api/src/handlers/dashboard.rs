//! Handler for the project dashboard summary.

use axum::extract::{Path, State};
use axum::Json;
use chrono::{Datelike, Utc};
use renotracker_core::expense::signed_spend;
use renotracker_core::task_status::TaskStatus;
use renotracker_core::types::DbId;
use renotracker_db::models::dashboard::{ProjectDashboard, StatusCount};
use renotracker_db::repositories::{DashboardRepo, ExpenseRepo, RoomRepo};
use rust_decimal::Decimal;

use super::ensure_project;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Number of expenses shown in the "recent" list.
const RECENT_EXPENSES: i64 = 10;

/// GET /api/v1/projects/{id}/dashboard
///
/// Spend totals count refunds negatively. `task_counts` always lists every
/// status, in board order.
pub async fn get_dashboard(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(project_id): Path<DbId>,
) -> AppResult<Json<DataResponse<ProjectDashboard>>> {
    let project = ensure_project(&state.pool, project_id).await?;

    let today = Utc::now().date_naive();
    let month_start = today
        .with_day(1)
        .ok_or_else(|| AppError::InternalError("Failed to compute month start".into()))?;

    let totals = DashboardRepo::spend_totals(&state.pool, project_id, month_start).await?;
    let (total_spend, month_spend) = totals.iter().fold(
        (Decimal::ZERO, Decimal::ZERO),
        |(total, month), row| {
            (
                total + signed_spend(row.total, row.is_refund),
                month + signed_spend(row.month_total, row.is_refund),
            )
        },
    );

    let counts = DashboardRepo::task_counts(&state.pool, project_id).await?;
    let task_counts: Vec<StatusCount> = TaskStatus::ALL
        .iter()
        .map(|&status| StatusCount {
            status,
            count: counts
                .iter()
                .find(|c| c.status == status)
                .map_or(0, |c| c.count),
        })
        .collect();
    let open_tasks = task_counts
        .iter()
        .filter(|c| c.status != TaskStatus::Done)
        .map(|c| c.count)
        .sum();

    let recent_expenses = ExpenseRepo::recent(&state.pool, project_id, RECENT_EXPENSES).await?;
    let rooms = RoomRepo::list(&state.pool, project_id).await?;

    Ok(Json(DataResponse {
        data: ProjectDashboard {
            project_id,
            currency: project.currency,
            total_spend,
            month_spend,
            open_tasks,
            task_counts,
            recent_expenses,
            rooms,
        },
    }))
}
