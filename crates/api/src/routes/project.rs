//! Route definitions for projects and everything nested under them.

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers;
use crate::state::AppState;

/// Routes mounted at `/projects`.
///
/// ```text
/// GET    /                                  -> list
/// POST   /                                  -> create
/// GET    /{id}                              -> get_by_id
/// PUT    /{id}                              -> update
/// DELETE /{id}                              -> archive
/// POST   /{id}/set-active                   -> set_active
/// GET    /{id}/dashboard                    -> dashboard
/// GET    /{id}/gantt                        -> gantt
/// ...    /{id}/rooms                        -> room routes
/// ...    /{id}/tasks                        -> task routes
/// ...    /{id}/expenses                     -> expense routes
/// ...    /{id}/documents                    -> document routes
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::project::list).post(handlers::project::create),
        )
        .route(
            "/{id}",
            get(handlers::project::get_by_id)
                .put(handlers::project::update)
                .delete(handlers::project::archive),
        )
        .route("/{id}/set-active", post(handlers::project::set_active))
        .route("/{id}/dashboard", get(handlers::dashboard::get_dashboard))
        .route("/{id}/gantt", get(handlers::gantt::get_gantt))
        .nest("/{id}/rooms", room_router())
        .nest("/{id}/tasks", task_router())
        .nest("/{id}/expenses", expense_router())
        .nest("/{id}/documents", document_router())
}

fn room_router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::room::list).post(handlers::room::create),
        )
        .route(
            "/{room_id}",
            get(handlers::room::get_by_id)
                .put(handlers::room::update)
                .delete(handlers::room::delete),
        )
}

fn task_router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::task::list).post(handlers::task::create),
        )
        .route("/board", get(handlers::task::board))
        .route(
            "/{task_id}",
            get(handlers::task::get_by_id)
                .put(handlers::task::update)
                .delete(handlers::task::delete),
        )
        .route("/{task_id}/move", post(handlers::task::move_task))
        .route("/{task_id}/progress", put(handlers::task::set_progress))
}

fn expense_router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::expense::list).post(handlers::expense::create),
        )
        .route(
            "/{expense_id}",
            get(handlers::expense::get_by_id)
                .put(handlers::expense::update)
                .delete(handlers::expense::delete),
        )
}

fn document_router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::document::list).post(handlers::document::upload),
        )
        .route(
            "/{document_id}",
            get(handlers::document::get_by_id)
                .put(handlers::document::update)
                .delete(handlers::document::delete),
        )
        .route("/{document_id}/download", get(handlers::document::download))
        .route("/{document_id}/preview", get(handlers::document::download))
        .layer(DefaultBodyLimit::max(handlers::document::MAX_UPLOAD_BYTES))
}
