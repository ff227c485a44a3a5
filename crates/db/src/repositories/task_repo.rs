//! Repository for the `tasks` and `task_dependencies` tables.

use std::collections::HashSet;

use renotracker_core::task_status::TaskState;
use renotracker_core::types::DbId;
use sqlx::PgPool;

use crate::models::task::{Task, TaskListParams, TaskRecord};

/// Column list shared across queries. Tables are aliased `t`.
const COLUMNS: &str = "t.id, t.project_id, t.room_id, t.title, t.description, t.status, \
    t.progress, t.priority, t.start_date, t.end_date, t.due_date, t.completed_at, \
    t.created_at, t.updated_at, \
    ARRAY(SELECT d.depends_on_id FROM task_dependencies d \
          WHERE d.task_id = t.id ORDER BY d.depends_on_id) AS depends_on";

/// Provides CRUD operations for tasks and their finish-to-start prerequisites.
pub struct TaskRepo;

impl TaskRepo {
    /// Insert a task and its prerequisites in one transaction.
    pub async fn create(
        pool: &PgPool,
        project_id: DbId,
        input: &TaskRecord,
    ) -> Result<Task, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let id: DbId = sqlx::query_scalar(
            "INSERT INTO tasks
                (project_id, room_id, title, description, status, progress, priority,
                 start_date, end_date, due_date, completed_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
             RETURNING id",
        )
        .bind(project_id)
        .bind(input.room_id)
        .bind(&input.title)
        .bind(&input.description)
        .bind(input.status.as_str())
        .bind(input.progress)
        .bind(input.priority)
        .bind(input.start_date)
        .bind(input.end_date)
        .bind(input.due_date)
        .bind(input.completed_at)
        .fetch_one(&mut *tx)
        .await?;

        if let Some(depends_on) = &input.depends_on {
            Self::set_dependencies_inner(&mut tx, project_id, id, depends_on).await?;
        }

        let query = format!("SELECT {COLUMNS} FROM tasks t WHERE t.id = $1");
        let task = sqlx::query_as::<_, Task>(&query)
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(task)
    }

    pub async fn find_by_id(
        pool: &PgPool,
        project_id: DbId,
        id: DbId,
    ) -> Result<Option<Task>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM tasks t WHERE t.id = $1 AND t.project_id = $2");
        sqlx::query_as::<_, Task>(&query)
            .bind(id)
            .bind(project_id)
            .fetch_optional(pool)
            .await
    }

    /// List a project's tasks, optionally filtered by status and room.
    ///
    /// Ordered by priority (P1 first), then due date (undated last), then id.
    pub async fn list(
        pool: &PgPool,
        project_id: DbId,
        params: &TaskListParams,
    ) -> Result<Vec<Task>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM tasks t
             WHERE t.project_id = $1
               AND ($2::TEXT IS NULL OR t.status = $2)
               AND ($3::BIGINT IS NULL OR t.room_id = $3)
             ORDER BY t.priority, t.due_date NULLS LAST, t.id"
        );
        sqlx::query_as::<_, Task>(&query)
            .bind(project_id)
            .bind(params.status.map(|s| s.as_str()))
            .bind(params.room_id)
            .fetch_all(pool)
            .await
    }

    /// Ids of every task in the project, for dependency validation.
    pub async fn list_ids(pool: &PgPool, project_id: DbId) -> Result<HashSet<DbId>, sqlx::Error> {
        let ids: Vec<DbId> = sqlx::query_scalar("SELECT id FROM tasks WHERE project_id = $1")
            .bind(project_id)
            .fetch_all(pool)
            .await?;
        Ok(ids.into_iter().collect())
    }

    pub async fn exists_in_project(
        pool: &PgPool,
        project_id: DbId,
        id: DbId,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM tasks WHERE id = $1 AND project_id = $2)")
            .bind(id)
            .bind(project_id)
            .fetch_one(pool)
            .await
    }

    /// Overwrite a task's columns, and its prerequisites when
    /// `input.depends_on` is set. Returns `None` if the task does not exist.
    pub async fn update(
        pool: &PgPool,
        project_id: DbId,
        id: DbId,
        input: &TaskRecord,
    ) -> Result<Option<Task>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let updated: Option<DbId> = sqlx::query_scalar(
            "UPDATE tasks SET
                room_id = $3,
                title = $4,
                description = $5,
                status = $6,
                progress = $7,
                priority = $8,
                start_date = $9,
                end_date = $10,
                due_date = $11,
                completed_at = $12
             WHERE id = $1 AND project_id = $2
             RETURNING id",
        )
        .bind(id)
        .bind(project_id)
        .bind(input.room_id)
        .bind(&input.title)
        .bind(&input.description)
        .bind(input.status.as_str())
        .bind(input.progress)
        .bind(input.priority)
        .bind(input.start_date)
        .bind(input.end_date)
        .bind(input.due_date)
        .bind(input.completed_at)
        .fetch_optional(&mut *tx)
        .await?;

        if updated.is_none() {
            return Ok(None);
        }

        if let Some(depends_on) = &input.depends_on {
            Self::set_dependencies_inner(&mut tx, project_id, id, depends_on).await?;
        }

        let query = format!("SELECT {COLUMNS} FROM tasks t WHERE t.id = $1");
        let task = sqlx::query_as::<_, Task>(&query)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(task)
    }

    /// Write only the status columns (kanban move, progress slider).
    pub async fn update_state(
        pool: &PgPool,
        project_id: DbId,
        id: DbId,
        state: &TaskState,
    ) -> Result<Option<Task>, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE tasks SET status = $3, progress = $4, completed_at = $5
             WHERE id = $1 AND project_id = $2",
        )
        .bind(id)
        .bind(project_id)
        .bind(state.status.as_str())
        .bind(state.progress)
        .bind(state.completed_at)
        .execute(pool)
        .await?;
        if result.rows_affected() == 0 {
            return Ok(None);
        }
        Self::find_by_id(pool, project_id, id).await
    }

    /// Delete a task.
    ///
    /// Its dependency rows (both directions) and document links cascade;
    /// expenses keep their rows with `task_id` set to NULL.
    pub async fn delete(pool: &PgPool, project_id: DbId, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1 AND project_id = $2")
            .bind(id)
            .bind(project_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Replace the prerequisites of `task_id` inside an existing transaction.
    ///
    /// Ids outside the project and self-references are ignored by the insert.
    async fn set_dependencies_inner(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        project_id: DbId,
        task_id: DbId,
        depends_on: &[DbId],
    ) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM task_dependencies WHERE task_id = $1")
            .bind(task_id)
            .execute(&mut **tx)
            .await?;

        if depends_on.is_empty() {
            return Ok(());
        }

        sqlx::query(
            "INSERT INTO task_dependencies (task_id, depends_on_id)
             SELECT $1, id FROM tasks
             WHERE project_id = $2 AND id = ANY($3) AND id <> $1
             ON CONFLICT DO NOTHING",
        )
        .bind(task_id)
        .bind(project_id)
        .bind(depends_on)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }
}
