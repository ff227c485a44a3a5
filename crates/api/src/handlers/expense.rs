//! Handlers for expenses, nested under `/projects/{id}/expenses`.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use renotracker_core::error::CoreError;
use renotracker_core::expense::compute_amounts;
use renotracker_core::patch;
use renotracker_core::types::DbId;
use renotracker_db::models::expense::{
    CreateExpense, Expense, ExpenseListParams, ExpenseRecord, UpdateExpense,
};
use renotracker_db::repositories::ExpenseRepo;

use super::{check_room_ref, check_task_ref, clean_text, ensure_project, required_text};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

fn expense_not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Expense",
        id,
    })
}

/// POST /api/v1/projects/{id}/expenses
///
/// The VAT amount is derived from `vat_rate` when only the rate is given.
pub async fn create(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(project_id): Path<DbId>,
    Json(input): Json<CreateExpense>,
) -> AppResult<(StatusCode, Json<DataResponse<Expense>>)> {
    ensure_project(&state.pool, project_id).await?;

    let description = required_text("Expense description", &input.description)?;
    let amounts = compute_amounts(input.gross_amount, input.vat_rate, input.vat_amount)?;
    check_room_ref(&state.pool, project_id, input.room_id).await?;
    check_task_ref(&state.pool, project_id, input.task_id).await?;

    let record = ExpenseRecord {
        room_id: input.room_id,
        task_id: input.task_id,
        purchase_date: input
            .purchase_date
            .unwrap_or_else(|| Utc::now().date_naive()),
        gross_amount: amounts.gross_amount,
        vat_rate: amounts.vat_rate,
        vat_amount: amounts.vat_amount,
        net_amount: amounts.net_amount,
        description,
        payment_method: clean_text(input.payment_method.as_deref()),
        vendor: clean_text(input.vendor.as_deref()),
        notes: clean_text(input.notes.as_deref()),
        is_refund: input.is_refund.unwrap_or(false),
    };
    let expense = ExpenseRepo::create(&state.pool, project_id, &record).await?;

    tracing::info!(
        project_id,
        expense_id = expense.id,
        gross = %expense.gross_amount,
        is_refund = expense.is_refund,
        "Expense recorded"
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: expense })))
}

/// GET /api/v1/projects/{id}/expenses?room_id=&task_id=
pub async fn list(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(project_id): Path<DbId>,
    Query(params): Query<ExpenseListParams>,
) -> AppResult<Json<DataResponse<Vec<Expense>>>> {
    ensure_project(&state.pool, project_id).await?;
    let expenses = ExpenseRepo::list(&state.pool, project_id, &params).await?;
    Ok(Json(DataResponse { data: expenses }))
}

/// GET /api/v1/projects/{id}/expenses/{expense_id}
pub async fn get_by_id(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path((project_id, id)): Path<(DbId, DbId)>,
) -> AppResult<Json<DataResponse<Expense>>> {
    let expense = ExpenseRepo::find_by_id(&state.pool, project_id, id)
        .await?
        .ok_or_else(|| expense_not_found(id))?;
    Ok(Json(DataResponse { data: expense }))
}

/// PUT /api/v1/projects/{id}/expenses/{expense_id}
///
/// A stored VAT amount is re-derived from the rate when the gross or the
/// rate changes and no explicit VAT amount is sent.
pub async fn update(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path((project_id, id)): Path<(DbId, DbId)>,
    Json(input): Json<UpdateExpense>,
) -> AppResult<Json<DataResponse<Expense>>> {
    let current = ExpenseRepo::find_by_id(&state.pool, project_id, id)
        .await?
        .ok_or_else(|| expense_not_found(id))?;

    let gross = input.gross_amount.unwrap_or(current.gross_amount);
    let vat_rate = patch::apply(input.vat_rate, current.vat_rate);
    let rederive = vat_rate.is_some() && (input.gross_amount.is_some() || input.vat_rate.is_some());
    let vat_amount = match input.vat_amount {
        Some(vat_amount) => vat_amount,
        None if rederive => None,
        None => current.vat_amount,
    };
    let amounts = compute_amounts(gross, vat_rate, vat_amount)?;

    let room_id = patch::apply(input.room_id, current.room_id);
    if room_id != current.room_id {
        check_room_ref(&state.pool, project_id, room_id).await?;
    }
    let task_id = patch::apply(input.task_id, current.task_id);
    if task_id != current.task_id {
        check_task_ref(&state.pool, project_id, task_id).await?;
    }

    let description = match input.description.as_deref() {
        Some(description) => required_text("Expense description", description)?,
        None => current.description,
    };

    let record = ExpenseRecord {
        room_id,
        task_id,
        purchase_date: input.purchase_date.unwrap_or(current.purchase_date),
        gross_amount: amounts.gross_amount,
        vat_rate: amounts.vat_rate,
        vat_amount: amounts.vat_amount,
        net_amount: amounts.net_amount,
        description,
        payment_method: match input.payment_method {
            Some(value) => clean_text(value.as_deref()),
            None => current.payment_method,
        },
        vendor: match input.vendor {
            Some(value) => clean_text(value.as_deref()),
            None => current.vendor,
        },
        notes: match input.notes {
            Some(value) => clean_text(value.as_deref()),
            None => current.notes,
        },
        is_refund: input.is_refund.unwrap_or(current.is_refund),
    };
    let expense = ExpenseRepo::update(&state.pool, project_id, id, &record)
        .await?
        .ok_or_else(|| expense_not_found(id))?;
    Ok(Json(DataResponse { data: expense }))
}

/// DELETE /api/v1/projects/{id}/expenses/{expense_id}
pub async fn delete(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path((project_id, id)): Path<(DbId, DbId)>,
) -> AppResult<StatusCode> {
    if ExpenseRepo::delete(&state.pool, project_id, id).await? {
        tracing::info!(project_id, expense_id = id, "Expense deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(expense_not_found(id))
    }
}
