//! Repository for the `expenses` table.

use renotracker_core::types::DbId;
use sqlx::PgPool;

use crate::models::expense::{Expense, ExpenseListParams, ExpenseRecord};

/// Column list shared across queries. The row source is aliased `e`.
const COLUMNS: &str = "e.id, e.project_id, e.room_id, e.task_id, e.purchase_date, \
    e.gross_amount, e.vat_rate, e.vat_amount, e.net_amount, e.description, \
    e.payment_method, e.vendor, e.notes, e.is_refund, e.created_at, e.updated_at, \
    ARRAY(SELECT de.document_id FROM document_expenses de \
          WHERE de.expense_id = e.id ORDER BY de.document_id) AS document_ids";

/// Provides CRUD operations for expenses.
pub struct ExpenseRepo;

impl ExpenseRepo {
    pub async fn create(
        pool: &PgPool,
        project_id: DbId,
        input: &ExpenseRecord,
    ) -> Result<Expense, sqlx::Error> {
        let query = format!(
            "WITH e AS (
                INSERT INTO expenses
                    (project_id, room_id, task_id, purchase_date, gross_amount, vat_rate,
                     vat_amount, net_amount, description, payment_method, vendor, notes,
                     is_refund)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
                RETURNING *
             )
             SELECT {COLUMNS} FROM e"
        );
        sqlx::query_as::<_, Expense>(&query)
            .bind(project_id)
            .bind(input.room_id)
            .bind(input.task_id)
            .bind(input.purchase_date)
            .bind(input.gross_amount)
            .bind(input.vat_rate)
            .bind(input.vat_amount)
            .bind(input.net_amount)
            .bind(&input.description)
            .bind(&input.payment_method)
            .bind(&input.vendor)
            .bind(&input.notes)
            .bind(input.is_refund)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(
        pool: &PgPool,
        project_id: DbId,
        id: DbId,
    ) -> Result<Option<Expense>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM expenses e WHERE e.id = $1 AND e.project_id = $2");
        sqlx::query_as::<_, Expense>(&query)
            .bind(id)
            .bind(project_id)
            .fetch_optional(pool)
            .await
    }

    /// List a project's expenses, newest purchase first.
    pub async fn list(
        pool: &PgPool,
        project_id: DbId,
        params: &ExpenseListParams,
    ) -> Result<Vec<Expense>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM expenses e
             WHERE e.project_id = $1
               AND ($2::BIGINT IS NULL OR e.room_id = $2)
               AND ($3::BIGINT IS NULL OR e.task_id = $3)
             ORDER BY e.purchase_date DESC, e.created_at DESC, e.id DESC"
        );
        sqlx::query_as::<_, Expense>(&query)
            .bind(project_id)
            .bind(params.room_id)
            .bind(params.task_id)
            .fetch_all(pool)
            .await
    }

    /// The `limit` most recent expenses of a project.
    pub async fn recent(
        pool: &PgPool,
        project_id: DbId,
        limit: i64,
    ) -> Result<Vec<Expense>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM expenses e
             WHERE e.project_id = $1
             ORDER BY e.purchase_date DESC, e.created_at DESC, e.id DESC
             LIMIT $2"
        );
        sqlx::query_as::<_, Expense>(&query)
            .bind(project_id)
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    pub async fn exists_in_project(
        pool: &PgPool,
        project_id: DbId,
        id: DbId,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM expenses WHERE id = $1 AND project_id = $2)",
        )
        .bind(id)
        .bind(project_id)
        .fetch_one(pool)
        .await
    }

    /// Overwrite an expense's columns. Returns `None` if it does not exist.
    pub async fn update(
        pool: &PgPool,
        project_id: DbId,
        id: DbId,
        input: &ExpenseRecord,
    ) -> Result<Option<Expense>, sqlx::Error> {
        let query = format!(
            "WITH e AS (
                UPDATE expenses SET
                    room_id = $3,
                    task_id = $4,
                    purchase_date = $5,
                    gross_amount = $6,
                    vat_rate = $7,
                    vat_amount = $8,
                    net_amount = $9,
                    description = $10,
                    payment_method = $11,
                    vendor = $12,
                    notes = $13,
                    is_refund = $14
                WHERE id = $1 AND project_id = $2
                RETURNING *
             )
             SELECT {COLUMNS} FROM e"
        );
        sqlx::query_as::<_, Expense>(&query)
            .bind(id)
            .bind(project_id)
            .bind(input.room_id)
            .bind(input.task_id)
            .bind(input.purchase_date)
            .bind(input.gross_amount)
            .bind(input.vat_rate)
            .bind(input.vat_amount)
            .bind(input.net_amount)
            .bind(&input.description)
            .bind(&input.payment_method)
            .bind(&input.vendor)
            .bind(&input.notes)
            .bind(input.is_refund)
            .fetch_optional(pool)
            .await
    }

    /// Delete an expense. Its document links cascade.
    pub async fn delete(pool: &PgPool, project_id: DbId, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM expenses WHERE id = $1 AND project_id = $2")
            .bind(id)
            .bind(project_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
