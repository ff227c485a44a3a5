//! Dashboard summary rows and response shape.

use renotracker_core::task_status::TaskStatus;
use renotracker_core::types::DbId;
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;

use crate::models::expense::Expense;
use crate::models::room::Room;

/// Gross totals for one side of the ledger (purchases or refunds).
#[derive(Debug, Clone, FromRow)]
pub struct SpendTotals {
    pub is_refund: bool,
    pub total: Decimal,
    pub month_total: Decimal,
}

/// Number of tasks in one status.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct StatusCount {
    #[sqlx(try_from = "String")]
    pub status: TaskStatus,
    pub count: i64,
}

/// Payload of `GET /projects/{id}/dashboard`.
#[derive(Debug, Clone, Serialize)]
pub struct ProjectDashboard {
    pub project_id: DbId,
    pub currency: String,
    /// Purchases minus refunds, all time.
    pub total_spend: Decimal,
    /// Purchases minus refunds since the first of the current month.
    pub month_spend: Decimal,
    pub open_tasks: i64,
    pub task_counts: Vec<StatusCount>,
    pub recent_expenses: Vec<Expense>,
    pub rooms: Vec<Room>,
}
