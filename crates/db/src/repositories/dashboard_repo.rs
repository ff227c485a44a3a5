//! Aggregate queries behind the project dashboard.

use renotracker_core::types::{Date, DbId};
use sqlx::PgPool;

use crate::models::dashboard::{SpendTotals, StatusCount};

/// Read-only summary queries over a project's tasks and expenses.
pub struct DashboardRepo;

impl DashboardRepo {
    /// Gross totals split by refund flag; `month_total` counts purchases on
    /// or after `month_start`. Sides with no expenses are omitted.
    pub async fn spend_totals(
        pool: &PgPool,
        project_id: DbId,
        month_start: Date,
    ) -> Result<Vec<SpendTotals>, sqlx::Error> {
        sqlx::query_as::<_, SpendTotals>(
            "SELECT is_refund,
                    COALESCE(SUM(gross_amount), 0) AS total,
                    COALESCE(SUM(gross_amount) FILTER (WHERE purchase_date >= $2), 0)
                        AS month_total
             FROM expenses
             WHERE project_id = $1
             GROUP BY is_refund",
        )
        .bind(project_id)
        .bind(month_start)
        .fetch_all(pool)
        .await
    }

    /// Task counts per status. Statuses with no tasks are omitted.
    pub async fn task_counts(
        pool: &PgPool,
        project_id: DbId,
    ) -> Result<Vec<StatusCount>, sqlx::Error> {
        sqlx::query_as::<_, StatusCount>(
            "SELECT status, COUNT(*) AS count
             FROM tasks
             WHERE project_id = $1
             GROUP BY status
             ORDER BY status",
        )
        .bind(project_id)
        .fetch_all(pool)
        .await
    }
}
