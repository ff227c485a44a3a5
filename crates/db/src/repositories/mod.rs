//! Repository layer: one zero-sized struct per table family.
//!
//! Every method takes a `&PgPool` and returns `Result<_, sqlx::Error>`.
//! Lookups scoped to a project take the project id so a row from another
//! project reads as "not found".

pub mod dashboard_repo;
pub mod document_repo;
pub mod expense_repo;
pub mod project_repo;
pub mod room_repo;
pub mod task_repo;
pub mod user_repo;

pub use dashboard_repo::DashboardRepo;
pub use document_repo::DocumentRepo;
pub use expense_repo::ExpenseRepo;
pub use project_repo::ProjectRepo;
pub use room_repo::RoomRepo;
pub use task_repo::TaskRepo;
pub use user_repo::UserRepo;
