//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - `Deserialize` create/update DTOs accepted by the API
//! - A `*Record` struct holding the validated column values a repository writes

pub mod dashboard;
pub mod document;
pub mod expense;
pub mod project;
pub mod room;
pub mod task;
pub mod user;
