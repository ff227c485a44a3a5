//! Repository for the `documents` table and its join tables
//! (`document_tasks`, `document_expenses`).

use renotracker_core::types::DbId;
use sqlx::PgPool;

use crate::models::document::{Document, DocumentListParams, DocumentRecord, StoredObject};

/// Column list shared across queries. The row source is aliased `doc`.
const COLUMNS: &str = "doc.id, doc.project_id, doc.room_id, doc.doc_type, doc.photo_group, \
    doc.title, doc.notes, doc.tags, doc.original_filename, doc.content_type, doc.size_bytes, \
    doc.storage_key, doc.created_at, doc.updated_at, \
    ARRAY(SELECT dt.task_id FROM document_tasks dt \
          WHERE dt.document_id = doc.id ORDER BY dt.task_id) AS task_ids, \
    ARRAY(SELECT de.expense_id FROM document_expenses de \
          WHERE de.document_id = doc.id ORDER BY de.expense_id) AS expense_ids";

/// Provides CRUD operations for document metadata and links.
pub struct DocumentRepo;

impl DocumentRepo {
    /// Insert a document row and its links in one transaction.
    ///
    /// Linked ids that do not belong to the project are skipped.
    pub async fn create(
        pool: &PgPool,
        project_id: DbId,
        input: &DocumentRecord,
        object: &StoredObject,
    ) -> Result<Document, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let id: DbId = sqlx::query_scalar(
            "INSERT INTO documents
                (project_id, room_id, doc_type, photo_group, title, notes, tags,
                 original_filename, content_type, size_bytes, storage_key)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
             RETURNING id",
        )
        .bind(project_id)
        .bind(input.room_id)
        .bind(input.doc_type.as_str())
        .bind(input.photo_group.map(|p| p.as_str()))
        .bind(&input.title)
        .bind(&input.notes)
        .bind(&input.tags)
        .bind(&object.original_filename)
        .bind(&object.content_type)
        .bind(object.size_bytes)
        .bind(&object.storage_key)
        .fetch_one(&mut *tx)
        .await?;

        Self::set_links_inner(&mut tx, project_id, id, input).await?;

        let query = format!("SELECT {COLUMNS} FROM documents doc WHERE doc.id = $1");
        let document = sqlx::query_as::<_, Document>(&query)
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(document)
    }

    pub async fn find_by_id(
        pool: &PgPool,
        project_id: DbId,
        id: DbId,
    ) -> Result<Option<Document>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM documents doc WHERE doc.id = $1 AND doc.project_id = $2"
        );
        sqlx::query_as::<_, Document>(&query)
            .bind(id)
            .bind(project_id)
            .fetch_optional(pool)
            .await
    }

    /// List a project's documents, newest first.
    ///
    /// `tag` matches case-insensitively; `doc_type` and `photo_group` must
    /// already be normalized.
    pub async fn list(
        pool: &PgPool,
        project_id: DbId,
        params: &DocumentListParams,
    ) -> Result<Vec<Document>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM documents doc
             WHERE doc.project_id = $1
               AND ($2::TEXT IS NULL
                    OR EXISTS (SELECT 1 FROM unnest(doc.tags) AS tag WHERE lower(tag) = lower($2)))
               AND ($3::TEXT IS NULL OR doc.doc_type = $3)
               AND ($4::TEXT IS NULL OR doc.photo_group = $4)
             ORDER BY doc.created_at DESC, doc.id DESC"
        );
        sqlx::query_as::<_, Document>(&query)
            .bind(project_id)
            .bind(&params.tag)
            .bind(&params.doc_type)
            .bind(&params.photo_group)
            .fetch_all(pool)
            .await
    }

    /// Overwrite a document's metadata, and its links where the record
    /// carries them. Returns `None` if the document does not exist.
    pub async fn update(
        pool: &PgPool,
        project_id: DbId,
        id: DbId,
        input: &DocumentRecord,
    ) -> Result<Option<Document>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let updated: Option<DbId> = sqlx::query_scalar(
            "UPDATE documents SET
                room_id = $3,
                doc_type = $4,
                photo_group = $5,
                title = $6,
                notes = $7,
                tags = $8
             WHERE id = $1 AND project_id = $2
             RETURNING id",
        )
        .bind(id)
        .bind(project_id)
        .bind(input.room_id)
        .bind(input.doc_type.as_str())
        .bind(input.photo_group.map(|p| p.as_str()))
        .bind(&input.title)
        .bind(&input.notes)
        .bind(&input.tags)
        .fetch_optional(&mut *tx)
        .await?;

        if updated.is_none() {
            return Ok(None);
        }

        Self::set_links_inner(&mut tx, project_id, id, input).await?;

        let query = format!("SELECT {COLUMNS} FROM documents doc WHERE doc.id = $1");
        let document = sqlx::query_as::<_, Document>(&query)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(document)
    }

    /// Delete a document and its links, returning the storage key of the
    /// removed row so the caller can delete the object.
    pub async fn delete(
        pool: &PgPool,
        project_id: DbId,
        id: DbId,
    ) -> Result<Option<String>, sqlx::Error> {
        sqlx::query_scalar(
            "DELETE FROM documents WHERE id = $1 AND project_id = $2 RETURNING storage_key",
        )
        .bind(id)
        .bind(project_id)
        .fetch_optional(pool)
        .await
    }

    /// Replace task and expense links inside an existing transaction.
    async fn set_links_inner(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        project_id: DbId,
        document_id: DbId,
        input: &DocumentRecord,
    ) -> Result<(), sqlx::Error> {
        if let Some(task_ids) = &input.task_ids {
            sqlx::query("DELETE FROM document_tasks WHERE document_id = $1")
                .bind(document_id)
                .execute(&mut **tx)
                .await?;
            sqlx::query(
                "INSERT INTO document_tasks (document_id, task_id)
                 SELECT $1, id FROM tasks WHERE project_id = $2 AND id = ANY($3)
                 ON CONFLICT DO NOTHING",
            )
            .bind(document_id)
            .bind(project_id)
            .bind(task_ids)
            .execute(&mut **tx)
            .await?;
        }

        if let Some(expense_ids) = &input.expense_ids {
            sqlx::query("DELETE FROM document_expenses WHERE document_id = $1")
                .bind(document_id)
                .execute(&mut **tx)
                .await?;
            sqlx::query(
                "INSERT INTO document_expenses (document_id, expense_id)
                 SELECT $1, id FROM expenses WHERE project_id = $2 AND id = ANY($3)
                 ON CONFLICT DO NOTHING",
            )
            .bind(document_id)
            .bind(project_id)
            .bind(expense_ids)
            .execute(&mut **tx)
            .await?;
        }

        Ok(())
    }
}
