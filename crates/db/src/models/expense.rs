//! Expense entity model and DTOs.

use renotracker_core::patch::double_option;
use renotracker_core::types::{Date, DbId, Timestamp};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// An expense row from the `expenses` table, with the ids of linked documents.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Expense {
    pub id: DbId,
    pub project_id: DbId,
    pub room_id: Option<DbId>,
    pub task_id: Option<DbId>,
    pub purchase_date: Date,
    pub gross_amount: Decimal,
    pub vat_rate: Option<Decimal>,
    pub vat_amount: Option<Decimal>,
    pub net_amount: Option<Decimal>,
    pub description: String,
    pub payment_method: Option<String>,
    pub vendor: Option<String>,
    pub notes: Option<String>,
    pub is_refund: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub document_ids: Vec<DbId>,
}

/// DTO for creating an expense. `purchase_date` defaults to today.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateExpense {
    pub purchase_date: Option<Date>,
    pub gross_amount: Decimal,
    pub vat_rate: Option<Decimal>,
    pub vat_amount: Option<Decimal>,
    pub description: String,
    pub payment_method: Option<String>,
    pub vendor: Option<String>,
    pub notes: Option<String>,
    pub is_refund: Option<bool>,
    pub room_id: Option<DbId>,
    pub task_id: Option<DbId>,
}

/// DTO for updating an expense.
///
/// Amount fields are recomputed together: sending `gross_amount` alone keeps
/// the stored VAT rate and re-derives the VAT amount from it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateExpense {
    pub purchase_date: Option<Date>,
    pub gross_amount: Option<Decimal>,
    #[serde(default, deserialize_with = "double_option")]
    pub vat_rate: Option<Option<Decimal>>,
    #[serde(default, deserialize_with = "double_option")]
    pub vat_amount: Option<Option<Decimal>>,
    pub description: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub payment_method: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub vendor: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub notes: Option<Option<String>>,
    pub is_refund: Option<bool>,
    #[serde(default, deserialize_with = "double_option")]
    pub room_id: Option<Option<DbId>>,
    #[serde(default, deserialize_with = "double_option")]
    pub task_id: Option<Option<DbId>>,
}

/// Query parameters for listing expenses.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExpenseListParams {
    pub room_id: Option<DbId>,
    pub task_id: Option<DbId>,
}

/// Validated column values written by `ExpenseRepo`.
#[derive(Debug, Clone)]
pub struct ExpenseRecord {
    pub room_id: Option<DbId>,
    pub task_id: Option<DbId>,
    pub purchase_date: Date,
    pub gross_amount: Decimal,
    pub vat_rate: Option<Decimal>,
    pub vat_amount: Option<Decimal>,
    pub net_amount: Option<Decimal>,
    pub description: String,
    pub payment_method: Option<String>,
    pub vendor: Option<String>,
    pub notes: Option<String>,
    pub is_refund: bool,
}
