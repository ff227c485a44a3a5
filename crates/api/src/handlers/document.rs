//! Handlers for documents, nested under `/projects/{id}/documents`.
//!
//! Uploads are multipart forms. The file goes to the object store under a
//! key derived from the project, the upload month and a fresh UUID; the row
//! keeps the key plus the metadata. Downloads redirect to a presigned URL.

use axum::extract::{Multipart, Path, Query, State};
use axum::http::header::LOCATION;
use axum::http::{HeaderName, StatusCode};
use axum::Json;
use chrono::Utc;
use renotracker_core::dependencies::parse_id_csv;
use renotracker_core::document::{
    normalize_tag_list, normalize_tags, resolve_title, storage_key, DocType, PhotoPhase,
};
use renotracker_core::error::CoreError;
use renotracker_core::patch;
use renotracker_core::types::DbId;
use renotracker_db::models::document::{
    Document, DocumentListParams, DocumentRecord, StoredObject, UpdateDocument,
};
use renotracker_db::repositories::DocumentRepo;
use uuid::Uuid;

use super::{check_room_ref, clean_text, ensure_project};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Largest accepted upload body.
pub const MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

fn document_not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Document",
        id,
    })
}

/// Text fields and the file collected from an upload form.
#[derive(Debug, Default)]
struct UploadForm {
    file: Option<UploadedFile>,
    title: Option<String>,
    notes: Option<String>,
    doc_type: Option<String>,
    photo_group: Option<String>,
    tags: Option<String>,
    room_id: Option<String>,
    task_ids: Option<String>,
    expense_ids: Option<String>,
}

#[derive(Debug)]
struct UploadedFile {
    filename: Option<String>,
    content_type: Option<String>,
    data: Vec<u8>,
}

async fn read_upload_form(mut multipart: Multipart) -> AppResult<UploadForm> {
    let mut form = UploadForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        let name = field.name().unwrap_or("").to_string();
        if name == "file" {
            let filename = field
                .file_name()
                .map(str::to_string)
                .filter(|f| !f.trim().is_empty());
            let content_type = field.content_type().map(str::to_string);
            let data = field
                .bytes()
                .await
                .map_err(|e| AppError::BadRequest(e.to_string()))?;
            form.file = Some(UploadedFile {
                filename,
                content_type,
                data: data.to_vec(),
            });
            continue;
        }

        let slot = match name.as_str() {
            "title" => &mut form.title,
            "notes" => &mut form.notes,
            "doc_type" => &mut form.doc_type,
            "photo_group" => &mut form.photo_group,
            "tags" => &mut form.tags,
            "room_id" => &mut form.room_id,
            "task_ids" => &mut form.task_ids,
            "expense_ids" => &mut form.expense_ids,
            _ => continue, // ignore unknown fields
        };
        let text = field
            .text()
            .await
            .map_err(|e| AppError::BadRequest(e.to_string()))?;
        *slot = Some(text);
    }

    Ok(form)
}

/// Parse the optional `room_id` form field. Blank means "no room".
fn parse_room_field(raw: Option<&str>) -> AppResult<Option<DbId>> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        Some(value) => value
            .parse()
            .map(Some)
            .map_err(|_| AppError::BadRequest(format!("Invalid room_id '{value}'"))),
        None => Ok(None),
    }
}

/// POST /api/v1/projects/{id}/documents
///
/// Multipart fields: `file` (required), `title`, `notes`, `doc_type`,
/// `photo_group`, `tags` (comma separated), `room_id`, `task_ids` and
/// `expense_ids` (comma separated). Linked ids outside the project are
/// ignored. When object storage is not configured the metadata is still
/// recorded but no bytes are stored.
pub async fn upload(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(project_id): Path<DbId>,
    multipart: Multipart,
) -> AppResult<(StatusCode, Json<DataResponse<Document>>)> {
    ensure_project(&state.pool, project_id).await?;

    let form = read_upload_form(multipart).await?;
    let file = form
        .file
        .ok_or_else(|| AppError::BadRequest("Missing required 'file' field".into()))?;

    let room_id = parse_room_field(form.room_id.as_deref())?;
    check_room_ref(&state.pool, project_id, room_id).await?;

    let doc_type = DocType::normalize(form.doc_type.as_deref());
    let record = DocumentRecord {
        room_id,
        doc_type,
        photo_group: PhotoPhase::normalize(doc_type, form.photo_group.as_deref()),
        title: resolve_title(form.title.as_deref(), file.filename.as_deref()),
        notes: clean_text(form.notes.as_deref()),
        tags: normalize_tags(form.tags.as_deref().unwrap_or("")),
        task_ids: Some(parse_id_csv(form.task_ids.as_deref().unwrap_or("")).into_iter().collect()),
        expense_ids: Some(
            parse_id_csv(form.expense_ids.as_deref().unwrap_or(""))
                .into_iter()
                .collect(),
        ),
    };

    let object = StoredObject {
        storage_key: storage_key(project_id, file.filename.as_deref(), Utc::now(), Uuid::new_v4()),
        original_filename: file.filename,
        content_type: file.content_type,
        size_bytes: file.data.len() as i64,
    };

    match &state.storage {
        Some(store) => {
            store
                .put(&object.storage_key, file.data, object.content_type.as_deref())
                .await?;
        }
        None => {
            tracing::warn!(
                project_id,
                key = %object.storage_key,
                "Object storage not configured; recording document without contents"
            );
        }
    }

    let document = match DocumentRepo::create(&state.pool, project_id, &record, &object).await {
        Ok(document) => document,
        Err(e) => {
            if let Some(store) = &state.storage {
                if let Err(cleanup) = store.delete(&object.storage_key).await {
                    tracing::warn!(key = %object.storage_key, error = %cleanup, "Failed to remove orphaned object");
                }
            }
            return Err(e.into());
        }
    };

    tracing::info!(
        project_id,
        document_id = document.id,
        doc_type = %document.doc_type,
        size_bytes = object.size_bytes,
        "Document uploaded"
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: document })))
}

/// Normalize list filters the same way uploads are stored. Blank values mean
/// "no filter"; unknown doc types or photo phases are rejected.
fn normalize_list_params(params: DocumentListParams) -> AppResult<DocumentListParams> {
    let doc_type = clean_text(params.doc_type.as_deref())
        .map(|raw| raw.parse::<DocType>())
        .transpose()?;
    let photo_group = clean_text(params.photo_group.as_deref())
        .map(|raw| raw.parse::<PhotoPhase>())
        .transpose()?;
    Ok(DocumentListParams {
        tag: clean_text(params.tag.as_deref()),
        doc_type: doc_type.map(|t| t.as_str().to_string()),
        photo_group: photo_group.map(|p| p.as_str().to_string()),
    })
}

/// GET /api/v1/projects/{id}/documents?tag=&doc_type=&photo_group=
pub async fn list(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(project_id): Path<DbId>,
    Query(params): Query<DocumentListParams>,
) -> AppResult<Json<DataResponse<Vec<Document>>>> {
    ensure_project(&state.pool, project_id).await?;
    let params = normalize_list_params(params)?;
    let documents = DocumentRepo::list(&state.pool, project_id, &params).await?;
    Ok(Json(DataResponse { data: documents }))
}

/// GET /api/v1/projects/{id}/documents/{document_id}
pub async fn get_by_id(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path((project_id, id)): Path<(DbId, DbId)>,
) -> AppResult<Json<DataResponse<Document>>> {
    let document = DocumentRepo::find_by_id(&state.pool, project_id, id)
        .await?
        .ok_or_else(|| document_not_found(id))?;
    Ok(Json(DataResponse { data: document }))
}

/// PUT /api/v1/projects/{id}/documents/{document_id}
///
/// Edits metadata and links. The stored file itself cannot be replaced.
pub async fn update(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path((project_id, id)): Path<(DbId, DbId)>,
    Json(input): Json<UpdateDocument>,
) -> AppResult<Json<DataResponse<Document>>> {
    let current = DocumentRepo::find_by_id(&state.pool, project_id, id)
        .await?
        .ok_or_else(|| document_not_found(id))?;

    let room_id = patch::apply(input.room_id, current.room_id);
    if room_id != current.room_id {
        check_room_ref(&state.pool, project_id, room_id).await?;
    }

    let doc_type = match input.doc_type.as_deref() {
        Some(raw) => DocType::normalize(Some(raw)),
        None => current.doc_type,
    };
    let photo_group = PhotoPhase::normalize(
        doc_type,
        input
            .photo_group
            .as_deref()
            .or(current.photo_group.as_deref()),
    );

    let title = match input.title.as_deref() {
        Some(title) => resolve_title(Some(title), current.original_filename.as_deref()),
        None => current.title,
    };

    let record = DocumentRecord {
        room_id,
        doc_type,
        photo_group,
        title,
        notes: match input.notes {
            Some(notes) => clean_text(notes.as_deref()),
            None => current.notes,
        },
        tags: match &input.tags {
            Some(tags) => normalize_tag_list(tags),
            None => current.tags,
        },
        task_ids: input.task_ids,
        expense_ids: input.expense_ids,
    };
    let document = DocumentRepo::update(&state.pool, project_id, id, &record)
        .await?
        .ok_or_else(|| document_not_found(id))?;
    Ok(Json(DataResponse { data: document }))
}

/// DELETE /api/v1/projects/{id}/documents/{document_id}
///
/// The row and its links are removed first; deleting the stored object is
/// best-effort and only logged on failure.
pub async fn delete(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path((project_id, id)): Path<(DbId, DbId)>,
) -> AppResult<StatusCode> {
    let key = DocumentRepo::delete(&state.pool, project_id, id)
        .await?
        .ok_or_else(|| document_not_found(id))?;

    if let Some(store) = &state.storage {
        if let Err(e) = store.delete(&key).await {
            tracing::warn!(document_id = id, key = %key, error = %e, "Failed to delete stored object");
        }
    }

    tracing::info!(project_id, document_id = id, "Document deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/projects/{id}/documents/{document_id}/download
/// GET /api/v1/projects/{id}/documents/{document_id}/preview
///
/// Redirects (302) to a presigned URL for the stored object. Answers 503
/// when object storage is not configured.
pub async fn download(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path((project_id, id)): Path<(DbId, DbId)>,
) -> AppResult<(StatusCode, [(HeaderName, String); 1])> {
    let document = DocumentRepo::find_by_id(&state.pool, project_id, id)
        .await?
        .ok_or_else(|| document_not_found(id))?;

    let store = state.storage()?;
    let url = store
        .presigned_get(&document.storage_key, state.config.storage.presign_expiry())
        .await?;

    Ok((StatusCode::FOUND, [(LOCATION, url)]))
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn blank_room_field_means_no_room() {
        assert_eq!(parse_room_field(None).unwrap(), None);
        assert_eq!(parse_room_field(Some("  ")).unwrap(), None);
        assert_eq!(parse_room_field(Some(" 12 ")).unwrap(), Some(12));
    }

    #[test]
    fn garbage_room_field_is_rejected() {
        assert_matches!(
            parse_room_field(Some("kitchen")),
            Err(AppError::BadRequest(_))
        );
    }

    #[test]
    fn list_filters_are_normalized() {
        let params = normalize_list_params(DocumentListParams {
            tag: Some("  ".into()),
            doc_type: Some(" Photo ".into()),
            photo_group: Some("AFTER".into()),
        })
        .unwrap();
        assert_eq!(params.tag, None);
        assert_eq!(params.doc_type.as_deref(), Some("photo"));
        assert_eq!(params.photo_group.as_deref(), Some("after"));
    }

    #[test]
    fn unknown_list_filter_is_rejected() {
        let params = DocumentListParams {
            doc_type: Some("invoice".into()),
            ..Default::default()
        };
        assert_matches!(
            normalize_list_params(params),
            Err(AppError::Core(CoreError::Validation(_)))
        );
    }
}
