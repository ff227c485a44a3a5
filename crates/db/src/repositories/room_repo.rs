//! Repository for the `rooms` table.

use renotracker_core::types::DbId;
use sqlx::PgPool;

use crate::models::room::{Room, RoomRecord};

const COLUMNS: &str = "id, project_id, name, floor, status, created_at, updated_at";

/// Provides CRUD operations for rooms within a project.
pub struct RoomRepo;

impl RoomRepo {
    pub async fn create(
        pool: &PgPool,
        project_id: DbId,
        input: &RoomRecord,
    ) -> Result<Room, sqlx::Error> {
        let query = format!(
            "INSERT INTO rooms (project_id, name, floor, status)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Room>(&query)
            .bind(project_id)
            .bind(&input.name)
            .bind(&input.floor)
            .bind(&input.status)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(
        pool: &PgPool,
        project_id: DbId,
        id: DbId,
    ) -> Result<Option<Room>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM rooms WHERE id = $1 AND project_id = $2");
        sqlx::query_as::<_, Room>(&query)
            .bind(id)
            .bind(project_id)
            .fetch_optional(pool)
            .await
    }

    /// List a project's rooms alphabetically, ignoring case.
    pub async fn list(pool: &PgPool, project_id: DbId) -> Result<Vec<Room>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM rooms WHERE project_id = $1 ORDER BY lower(name), id"
        );
        sqlx::query_as::<_, Room>(&query)
            .bind(project_id)
            .fetch_all(pool)
            .await
    }

    /// Whether the project already has a room called `name` (case-insensitive),
    /// not counting `exclude_id`.
    pub async fn name_taken(
        pool: &PgPool,
        project_id: DbId,
        name: &str,
        exclude_id: Option<DbId>,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT EXISTS(
                SELECT 1 FROM rooms
                WHERE project_id = $1
                  AND lower(name) = lower($2)
                  AND ($3::BIGINT IS NULL OR id <> $3)
             )",
        )
        .bind(project_id)
        .bind(name)
        .bind(exclude_id)
        .fetch_one(pool)
        .await
    }

    pub async fn exists(pool: &PgPool, project_id: DbId, id: DbId) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM rooms WHERE id = $1 AND project_id = $2)")
            .bind(id)
            .bind(project_id)
            .fetch_one(pool)
            .await
    }

    /// Overwrite a room's columns. Returns `None` if the room does not exist.
    pub async fn update(
        pool: &PgPool,
        project_id: DbId,
        id: DbId,
        input: &RoomRecord,
    ) -> Result<Option<Room>, sqlx::Error> {
        let query = format!(
            "UPDATE rooms SET name = $3, floor = $4, status = $5
             WHERE id = $1 AND project_id = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Room>(&query)
            .bind(id)
            .bind(project_id)
            .bind(&input.name)
            .bind(&input.floor)
            .bind(&input.status)
            .fetch_optional(pool)
            .await
    }

    /// Delete a room. Tasks, expenses and documents keep their rows with
    /// `room_id` set to NULL.
    pub async fn delete(pool: &PgPool, project_id: DbId, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM rooms WHERE id = $1 AND project_id = $2")
            .bind(id)
            .bind(project_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
