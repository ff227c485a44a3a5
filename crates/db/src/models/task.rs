//! Task entity model and DTOs.

use renotracker_core::dependencies::to_csv;
use renotracker_core::patch::double_option;
use renotracker_core::task_status::TaskStatus;
use renotracker_core::timeline::{TaskDates, TimelineTask};
use renotracker_core::types::{Date, DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A task row from the `tasks` table, with its prerequisite ids.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Task {
    pub id: DbId,
    pub project_id: DbId,
    pub room_id: Option<DbId>,
    pub title: String,
    pub description: Option<String>,
    #[sqlx(try_from = "String")]
    pub status: TaskStatus,
    pub progress: i32,
    pub priority: i32,
    pub start_date: Option<Date>,
    pub end_date: Option<Date>,
    pub due_date: Option<Date>,
    pub completed_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    /// Finish-to-start prerequisites, ascending.
    pub depends_on: Vec<DbId>,
}

impl Task {
    /// Prerequisites in their canonical CSV form.
    pub fn dependencies_csv(&self) -> String {
        to_csv(&self.depends_on.iter().copied().collect())
    }

    pub fn dates(&self) -> TaskDates {
        TaskDates {
            start_date: self.start_date,
            end_date: self.end_date,
            due_date: self.due_date,
            completed_at: self.completed_at,
            created_at: Some(self.created_at),
        }
    }

    pub fn to_timeline(&self) -> TimelineTask {
        TimelineTask {
            id: self.id,
            title: self.title.clone(),
            status: self.status,
            progress: self.progress,
            priority: self.priority,
            room_id: self.room_id,
            dates: self.dates(),
            depends_on: self.depends_on.clone(),
        }
    }
}

/// DTO for creating a task.
///
/// `dependencies` is a CSV list of prerequisite task ids (`"3, 7"`).
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTask {
    pub title: String,
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
    pub progress: Option<i32>,
    pub priority: Option<i32>,
    pub start_date: Option<Date>,
    pub end_date: Option<Date>,
    pub due_date: Option<Date>,
    pub room_id: Option<DbId>,
    pub dependencies: Option<String>,
}

/// DTO for updating a task. Nullable columns accept an explicit `null` to clear them.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateTask {
    pub title: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
    pub status: Option<TaskStatus>,
    pub progress: Option<i32>,
    pub priority: Option<i32>,
    #[serde(default, deserialize_with = "double_option")]
    pub start_date: Option<Option<Date>>,
    #[serde(default, deserialize_with = "double_option")]
    pub end_date: Option<Option<Date>>,
    #[serde(default, deserialize_with = "double_option")]
    pub due_date: Option<Option<Date>>,
    #[serde(default, deserialize_with = "double_option")]
    pub room_id: Option<Option<DbId>>,
    /// Replaces the full prerequisite set when present; `""` clears it.
    pub dependencies: Option<String>,
}

/// Request body for `POST .../tasks/{id}/move`.
#[derive(Debug, Clone, Deserialize)]
pub struct MoveTask {
    pub status: TaskStatus,
}

/// Request body for `PUT .../tasks/{id}/progress`.
#[derive(Debug, Clone, Deserialize)]
pub struct SetTaskProgress {
    pub progress: i32,
}

/// Query parameters for listing tasks.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaskListParams {
    pub status: Option<TaskStatus>,
    pub room_id: Option<DbId>,
}

/// Validated column values written by `TaskRepo`.
#[derive(Debug, Clone)]
pub struct TaskRecord {
    pub room_id: Option<DbId>,
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub progress: i32,
    pub priority: i32,
    pub start_date: Option<Date>,
    pub end_date: Option<Date>,
    pub due_date: Option<Date>,
    pub completed_at: Option<Timestamp>,
    /// `None` leaves the stored prerequisites untouched on update.
    pub depends_on: Option<Vec<DbId>>,
}

/// One kanban column.
#[derive(Debug, Clone, Serialize)]
pub struct BoardColumn {
    pub status: TaskStatus,
    pub tasks: Vec<Task>,
}

/// Group tasks into one column per status, in workflow order.
///
/// Within a column tasks keep the order they were given in.
pub fn group_board(tasks: Vec<Task>) -> Vec<BoardColumn> {
    let mut columns: Vec<BoardColumn> = TaskStatus::ALL
        .iter()
        .map(|&status| BoardColumn {
            status,
            tasks: Vec::new(),
        })
        .collect();
    for task in tasks {
        if let Some(column) = columns.iter_mut().find(|c| c.status == task.status) {
            column.tasks.push(task);
        }
    }
    columns
}
