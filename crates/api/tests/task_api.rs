//! HTTP-level tests for tasks: status synchronization, dependencies,
//! the kanban board, the Gantt view and delete cascades.

mod common;

use axum::http::StatusCode;
use common::{
    body_json, create_project, create_task, delete_auth, get_auth, post_json_auth, put_json_auth,
};
use serde_json::json;
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Status synchronization
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn test_progress_100_round_trips_as_done(pool: PgPool) {
    let token = common::auth_token(&pool).await;
    let app = common::build_test_app(pool);
    let pid = create_project(app.clone(), &token, "Kitchen refit").await;

    let created = create_task(
        app.clone(),
        &token,
        pid,
        json!({ "title": "Fit worktop", "progress": 100 }),
    )
    .await;
    let id = created["id"].as_i64().unwrap();

    let response = get_auth(app, &format!("/api/v1/projects/{pid}/tasks/{id}"), &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let task = body_json(response).await["data"].clone();
    assert_eq!(task["status"], "done");
    assert_eq!(task["progress"], 100);
    assert!(task["completed_at"].is_string());
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_new_task_defaults(pool: PgPool) {
    let token = common::auth_token(&pool).await;
    let app = common::build_test_app(pool);
    let pid = create_project(app.clone(), &token, "Bathroom").await;

    let task = create_task(app, &token, pid, json!({ "title": "  Strip tiles  " })).await;
    assert_eq!(task["title"], "Strip tiles");
    assert_eq!(task["status"], "todo");
    assert_eq!(task["progress"], 0);
    assert_eq!(task["priority"], 3);
    assert!(task["completed_at"].is_null());
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_progress_edits_follow_three_bands(pool: PgPool) {
    let token = common::auth_token(&pool).await;
    let app = common::build_test_app(pool);
    let pid = create_project(app.clone(), &token, "Hallway").await;
    let id = create_task(app.clone(), &token, pid, json!({ "title": "Paint" })).await["id"]
        .as_i64()
        .unwrap();
    let uri = format!("/api/v1/projects/{pid}/tasks/{id}/progress");

    for (progress, status) in [(1, "doing"), (99, "doing"), (100, "done"), (0, "todo")] {
        let response =
            put_json_auth(app.clone(), &uri, &token, json!({ "progress": progress })).await;
        assert_eq!(response.status(), StatusCode::OK);
        let task = body_json(response).await["data"].clone();
        assert_eq!(task["status"], status, "progress {progress}");
        assert_eq!(task["completed_at"].is_string(), status == "done");
    }
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_out_of_range_progress_returns_400(pool: PgPool) {
    let token = common::auth_token(&pool).await;
    let app = common::build_test_app(pool);
    let pid = create_project(app.clone(), &token, "Hallway").await;
    let id = create_task(app.clone(), &token, pid, json!({ "title": "Paint" })).await["id"]
        .as_i64()
        .unwrap();

    let response = put_json_auth(
        app,
        &format!("/api/v1/projects/{pid}/tasks/{id}/progress"),
        &token,
        json!({ "progress": 101 }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_blocked_survives_progress_until_done(pool: PgPool) {
    let token = common::auth_token(&pool).await;
    let app = common::build_test_app(pool);
    let pid = create_project(app.clone(), &token, "Roof").await;
    let id = create_task(
        app.clone(),
        &token,
        pid,
        json!({ "title": "Replace flashing", "status": "blocked", "progress": 20 }),
    )
    .await["id"]
        .as_i64()
        .unwrap();
    let uri = format!("/api/v1/projects/{pid}/tasks/{id}/progress");

    let response = put_json_auth(app.clone(), &uri, &token, json!({ "progress": 60 })).await;
    let task = body_json(response).await["data"].clone();
    assert_eq!(task["status"], "blocked");
    assert_eq!(task["progress"], 60);

    let response = put_json_auth(app, &uri, &token, json!({ "progress": 100 })).await;
    let task = body_json(response).await["data"].clone();
    assert_eq!(task["status"], "done");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_move_pulls_progress_into_band(pool: PgPool) {
    let token = common::auth_token(&pool).await;
    let app = common::build_test_app(pool);
    let pid = create_project(app.clone(), &token, "Garden").await;
    let id = create_task(app.clone(), &token, pid, json!({ "title": "Lay patio" })).await["id"]
        .as_i64()
        .unwrap();
    let uri = format!("/api/v1/projects/{pid}/tasks/{id}/move");

    let response = post_json_auth(app.clone(), &uri, &token, json!({ "status": "doing" })).await;
    assert_eq!(response.status(), StatusCode::OK);
    let task = body_json(response).await["data"].clone();
    assert_eq!(task["status"], "doing");
    assert_eq!(task["progress"], 1);

    let response = post_json_auth(app.clone(), &uri, &token, json!({ "status": "done" })).await;
    let task = body_json(response).await["data"].clone();
    assert_eq!(task["progress"], 100);
    assert!(task["completed_at"].is_string());

    let response = post_json_auth(app, &uri, &token, json!({ "status": "todo" })).await;
    let task = body_json(response).await["data"].clone();
    assert_eq!(task["progress"], 0);
    assert!(task["completed_at"].is_null());
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn test_end_before_start_returns_400(pool: PgPool) {
    let token = common::auth_token(&pool).await;
    let app = common::build_test_app(pool);
    let pid = create_project(app.clone(), &token, "Loft").await;

    let response = post_json_auth(
        app,
        &format!("/api/v1/projects/{pid}/tasks"),
        &token,
        json!({ "title": "Insulate", "start_date": "2025-05-10", "end_date": "2025-05-01" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_unknown_room_reference_returns_400(pool: PgPool) {
    let token = common::auth_token(&pool).await;
    let app = common::build_test_app(pool);
    let pid = create_project(app.clone(), &token, "Loft").await;

    let response = post_json_auth(
        app,
        &format!("/api/v1/projects/{pid}/tasks"),
        &token,
        json!({ "title": "Insulate", "room_id": 987654 }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_bad_priority_returns_400(pool: PgPool) {
    let token = common::auth_token(&pool).await;
    let app = common::build_test_app(pool);
    let pid = create_project(app.clone(), &token, "Loft").await;

    let response = post_json_auth(
        app,
        &format!("/api/v1/projects/{pid}/tasks"),
        &token,
        json!({ "title": "Insulate", "priority": 9 }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------------------
// Dependencies
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn test_unknown_and_self_dependencies_are_dropped(pool: PgPool) {
    let token = common::auth_token(&pool).await;
    let app = common::build_test_app(pool);
    let pid = create_project(app.clone(), &token, "Kitchen").await;
    let other_pid = create_project(app.clone(), &token, "Shed").await;

    let first = create_task(app.clone(), &token, pid, json!({ "title": "Rip out units" })).await;
    let first_id = first["id"].as_i64().unwrap();
    let foreign = create_task(app.clone(), &token, other_pid, json!({ "title": "Felt roof" })).await;
    let foreign_id = foreign["id"].as_i64().unwrap();

    let second = create_task(
        app.clone(),
        &token,
        pid,
        json!({ "title": "Plaster", "dependencies": format!("{first_id}, 999999; {foreign_id}, abc") }),
    )
    .await;
    let second_id = second["id"].as_i64().unwrap();
    assert_eq!(second["depends_on"], json!([first_id]));

    // A task cannot depend on itself.
    let response = put_json_auth(
        app,
        &format!("/api/v1/projects/{pid}/tasks/{second_id}"),
        &token,
        json!({ "dependencies": format!("{second_id},{first_id}") }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let task = body_json(response).await["data"].clone();
    assert_eq!(task["depends_on"], json!([first_id]));
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_update_without_dependencies_keeps_them(pool: PgPool) {
    let token = common::auth_token(&pool).await;
    let app = common::build_test_app(pool);
    let pid = create_project(app.clone(), &token, "Kitchen").await;

    let first_id = create_task(app.clone(), &token, pid, json!({ "title": "First" })).await["id"]
        .as_i64()
        .unwrap();
    let second_id = create_task(
        app.clone(),
        &token,
        pid,
        json!({ "title": "Second", "dependencies": first_id.to_string() }),
    )
    .await["id"]
        .as_i64()
        .unwrap();
    let uri = format!("/api/v1/projects/{pid}/tasks/{second_id}");

    let response = put_json_auth(app.clone(), &uri, &token, json!({ "title": "Renamed" })).await;
    let task = body_json(response).await["data"].clone();
    assert_eq!(task["title"], "Renamed");
    assert_eq!(task["depends_on"], json!([first_id]));

    let response = put_json_auth(app, &uri, &token, json!({ "dependencies": "" })).await;
    let task = body_json(response).await["data"].clone();
    assert_eq!(task["depends_on"], json!([]));
}

// ---------------------------------------------------------------------------
// Board and Gantt
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn test_board_has_every_column(pool: PgPool) {
    let token = common::auth_token(&pool).await;
    let app = common::build_test_app(pool);
    let pid = create_project(app.clone(), &token, "Kitchen").await;
    create_task(app.clone(), &token, pid, json!({ "title": "A", "progress": 50 })).await;

    let response = get_auth(app, &format!("/api/v1/projects/{pid}/tasks/board"), &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let columns = body_json(response).await["data"].clone();
    let statuses: Vec<&str> = columns
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["status"].as_str().unwrap())
        .collect();
    assert_eq!(statuses, vec!["todo", "doing", "blocked", "done"]);
    assert_eq!(columns[1]["tasks"].as_array().unwrap().len(), 1);
    assert!(columns[0]["tasks"].as_array().unwrap().is_empty());
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_gantt_resolves_dates_and_edges(pool: PgPool) {
    let token = common::auth_token(&pool).await;
    let app = common::build_test_app(pool);
    let pid = create_project(app.clone(), &token, "Extension").await;

    let footings = create_task(
        app.clone(),
        &token,
        pid,
        json!({ "title": "Footings", "start_date": "2025-04-01", "due_date": "2025-04-05" }),
    )
    .await;
    let footings_id = footings["id"].as_i64().unwrap();
    let walls = create_task(
        app.clone(),
        &token,
        pid,
        json!({
            "title": "Walls",
            "start_date": "2025-04-06",
            "dependencies": footings_id.to_string(),
        }),
    )
    .await;
    let walls_id = walls["id"].as_i64().unwrap();

    let response = get_auth(app, &format!("/api/v1/projects/{pid}/gantt"), &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let view = body_json(response).await["data"].clone();

    let bars = view["tasks"].as_array().unwrap();
    assert_eq!(bars.len(), 2);
    assert_eq!(bars[0]["id"], footings_id);
    assert_eq!(bars[0]["start"], "2025-04-01");
    assert_eq!(bars[0]["end"], "2025-04-05");
    assert_eq!(bars[1]["name"], "Walls");
    // No end, completion or due date: one day long.
    assert_eq!(bars[1]["end"], "2025-04-07");
    assert_eq!(bars[1]["dependencies"], footings_id.to_string());

    assert_eq!(
        view["edges"],
        json!([{ "from": footings_id, "to": walls_id, "kind": "finish_to_start" }])
    );
}

// ---------------------------------------------------------------------------
// Delete
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn test_delete_task_cascades(pool: PgPool) {
    let token = common::auth_token(&pool).await;
    let app = common::build_test_app(pool);
    let pid = create_project(app.clone(), &token, "Kitchen").await;

    let first_id = create_task(app.clone(), &token, pid, json!({ "title": "First" })).await["id"]
        .as_i64()
        .unwrap();
    let second_id = create_task(
        app.clone(),
        &token,
        pid,
        json!({ "title": "Second", "dependencies": first_id.to_string() }),
    )
    .await["id"]
        .as_i64()
        .unwrap();

    let response = post_json_auth(
        app.clone(),
        &format!("/api/v1/projects/{pid}/expenses"),
        &token,
        json!({ "description": "Plasterboard", "gross_amount": "84.00", "task_id": first_id }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let expense_id = body_json(response).await["data"]["id"].as_i64().unwrap();

    let response = delete_auth(
        app.clone(),
        &format!("/api/v1/projects/{pid}/tasks/{first_id}"),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = get_auth(
        app.clone(),
        &format!("/api/v1/projects/{pid}/tasks/{first_id}"),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = get_auth(
        app.clone(),
        &format!("/api/v1/projects/{pid}/tasks/{second_id}"),
        &token,
    )
    .await;
    assert_eq!(body_json(response).await["data"]["depends_on"], json!([]));

    let response = get_auth(
        app,
        &format!("/api/v1/projects/{pid}/expenses/{expense_id}"),
        &token,
    )
    .await;
    assert!(body_json(response).await["data"]["task_id"].is_null());
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_task_from_other_project_is_404(pool: PgPool) {
    let token = common::auth_token(&pool).await;
    let app = common::build_test_app(pool);
    let pid = create_project(app.clone(), &token, "Kitchen").await;
    let other = create_project(app.clone(), &token, "Shed").await;
    let id = create_task(app.clone(), &token, pid, json!({ "title": "Mine" })).await["id"]
        .as_i64()
        .unwrap();

    let response = get_auth(app, &format!("/api/v1/projects/{other}/tasks/{id}"), &token).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
