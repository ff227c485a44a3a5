pub mod auth;
pub mod health;
pub mod project;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/login                                      login (public)
/// /auth/logout                                     logout
/// /auth/me                                         current user
///
/// /projects                                        list, create
/// /projects/{id}                                   get, update, archive
/// /projects/{id}/set-active                        set active project (POST)
/// /projects/{id}/dashboard                         spend + task summary
/// /projects/{id}/gantt                             Gantt view model
///
/// /projects/{id}/rooms                             list, create
/// /projects/{id}/rooms/{room_id}                   get, update, delete
///
/// /projects/{id}/tasks                             list, create
/// /projects/{id}/tasks/board                       kanban columns
/// /projects/{id}/tasks/{task_id}                   get, update, delete
/// /projects/{id}/tasks/{task_id}/move              set status (POST)
/// /projects/{id}/tasks/{task_id}/progress          set progress (PUT)
///
/// /projects/{id}/expenses                          list, create
/// /projects/{id}/expenses/{expense_id}             get, update, delete
///
/// /projects/{id}/documents                         list, upload (multipart)
/// /projects/{id}/documents/{document_id}           get, update, delete
/// /projects/{id}/documents/{document_id}/download  302 to presigned URL
/// /projects/{id}/documents/{document_id}/preview   same redirect, for inline viewing
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/projects", project::router())
}
