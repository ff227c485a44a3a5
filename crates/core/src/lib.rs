//! RenoTracker domain rules.
//!
//! Pure logic with no I/O: task status synchronization, timeline date
//! resolution, dependency linking, and the normalization rules applied to
//! rooms, expenses and documents before they are persisted.

pub mod dependencies;
pub mod document;
pub mod error;
pub mod expense;
pub mod patch;
pub mod room;
pub mod task_status;
pub mod timeline;
pub mod types;
