//! Task status synchronization.
//!
//! Status is derived from progress in three bands (0 -> Todo, 1..=99 -> Doing,
//! 100 -> Done). `Blocked` is the only status that is set by hand and it
//! survives progress edits until the task reaches 100.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::Timestamp;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Lowest valid progress value.
pub const PROGRESS_MIN: i32 = 0;

/// Highest valid progress value. Reaching it completes the task.
pub const PROGRESS_MAX: i32 = 100;

/// Highest priority (P1).
pub const PRIORITY_HIGHEST: i32 = 1;

/// Lowest priority (P5).
pub const PRIORITY_LOWEST: i32 = 5;

/// Priority assigned when none is supplied (P3).
pub const PRIORITY_DEFAULT: i32 = 3;

// ---------------------------------------------------------------------------
// TaskStatus
// ---------------------------------------------------------------------------

/// Kanban column a task sits in. Stored as lower-case text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Todo,
    Doing,
    Blocked,
    Done,
}

impl TaskStatus {
    /// All statuses in board column order.
    pub const ALL: [TaskStatus; 4] = [
        TaskStatus::Todo,
        TaskStatus::Doing,
        TaskStatus::Blocked,
        TaskStatus::Done,
    ];

    /// The database / wire representation.
    pub fn as_str(self) -> &'static str {
        match self {
            TaskStatus::Todo => "todo",
            TaskStatus::Doing => "doing",
            TaskStatus::Blocked => "blocked",
            TaskStatus::Done => "done",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "todo" => Ok(TaskStatus::Todo),
            "doing" => Ok(TaskStatus::Doing),
            "blocked" => Ok(TaskStatus::Blocked),
            "done" => Ok(TaskStatus::Done),
            other => Err(CoreError::Validation(format!(
                "Unknown task status '{other}'. Must be one of: todo, doing, blocked, done"
            ))),
        }
    }
}

impl TryFrom<String> for TaskStatus {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Reject progress values outside `[0, 100]`.
pub fn validate_progress(progress: i32) -> Result<(), CoreError> {
    if (PROGRESS_MIN..=PROGRESS_MAX).contains(&progress) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Progress must be between {PROGRESS_MIN} and {PROGRESS_MAX}, got {progress}"
        )))
    }
}

/// Reject priorities outside P1..P5.
pub fn validate_priority(priority: i32) -> Result<(), CoreError> {
    if (PRIORITY_HIGHEST..=PRIORITY_LOWEST).contains(&priority) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Priority must be between {PRIORITY_HIGHEST} and {PRIORITY_LOWEST}, got {priority}"
        )))
    }
}

/// Derive the status for a progress value using the three-band rule.
pub fn derive_status(progress: i32) -> Result<TaskStatus, CoreError> {
    validate_progress(progress)?;
    Ok(match progress {
        PROGRESS_MIN => TaskStatus::Todo,
        PROGRESS_MAX => TaskStatus::Done,
        _ => TaskStatus::Doing,
    })
}

/// Progress value that keeps `current` consistent with an explicitly chosen status.
pub fn progress_for_status(status: TaskStatus, current: i32) -> i32 {
    match status {
        TaskStatus::Todo => PROGRESS_MIN,
        TaskStatus::Done => PROGRESS_MAX,
        TaskStatus::Doing => current.clamp(PROGRESS_MIN + 1, PROGRESS_MAX - 1),
        TaskStatus::Blocked => current.clamp(PROGRESS_MIN, PROGRESS_MAX - 1),
    }
}

// ---------------------------------------------------------------------------
// Reconciliation
// ---------------------------------------------------------------------------

/// The status-related columns of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskState {
    pub status: TaskStatus,
    pub progress: i32,
    pub completed_at: Option<Timestamp>,
}

impl Default for TaskState {
    fn default() -> Self {
        Self {
            status: TaskStatus::Todo,
            progress: PROGRESS_MIN,
            completed_at: None,
        }
    }
}

/// A requested change to a task's status columns. `None` leaves a field alone.
#[derive(Debug, Clone, Copy, Default)]
pub struct TaskChange {
    pub status: Option<TaskStatus>,
    pub progress: Option<i32>,
}

/// Apply `change` to `current`, keeping status, progress and `completed_at`
/// consistent.
///
/// Progress wins over status when both are supplied, except that `Blocked`
/// (requested, or already set and not overridden) is kept below 100.
pub fn reconcile(
    current: TaskState,
    change: TaskChange,
    now: Timestamp,
) -> Result<TaskState, CoreError> {
    let (status, progress) = match (change.progress, change.status) {
        (Some(progress), requested) => {
            let derived = derive_status(progress)?;
            let wants_blocked = match requested {
                Some(status) => status == TaskStatus::Blocked,
                None => current.status == TaskStatus::Blocked,
            };
            if wants_blocked && derived != TaskStatus::Done {
                (TaskStatus::Blocked, progress)
            } else {
                (derived, progress)
            }
        }
        (None, Some(status)) => (status, progress_for_status(status, current.progress)),
        (None, None) => (current.status, current.progress),
    };

    let completed_at = if status == TaskStatus::Done {
        current.completed_at.or(Some(now))
    } else {
        None
    };

    Ok(TaskState {
        status,
        progress,
        completed_at,
    })
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use chrono::{TimeZone, Utc};

    use super::*;

    fn now() -> Timestamp {
        Utc.with_ymd_and_hms(2025, 3, 14, 9, 30, 0).unwrap()
    }

    // -----------------------------------------------------------------------
    // Three-band rule
    // -----------------------------------------------------------------------

    #[test]
    fn zero_is_todo() {
        assert_eq!(derive_status(0).unwrap(), TaskStatus::Todo);
    }

    #[test]
    fn one_is_doing() {
        assert_eq!(derive_status(1).unwrap(), TaskStatus::Doing);
    }

    #[test]
    fn ninety_nine_is_doing() {
        assert_eq!(derive_status(99).unwrap(), TaskStatus::Doing);
    }

    #[test]
    fn hundred_is_done() {
        assert_eq!(derive_status(100).unwrap(), TaskStatus::Done);
    }

    #[test]
    fn every_value_in_range_matches_bands() {
        for p in 0..=100 {
            let expected = match p {
                0 => TaskStatus::Todo,
                100 => TaskStatus::Done,
                _ => TaskStatus::Doing,
            };
            assert_eq!(derive_status(p).unwrap(), expected, "progress {p}");
        }
    }

    #[test]
    fn out_of_range_progress_rejected() {
        assert_matches!(derive_status(-1), Err(CoreError::Validation(_)));
        assert_matches!(derive_status(101), Err(CoreError::Validation(_)));
    }

    #[test]
    fn priority_bounds() {
        assert!(validate_priority(1).is_ok());
        assert!(validate_priority(5).is_ok());
        assert!(validate_priority(0).is_err());
        assert!(validate_priority(6).is_err());
    }

    #[test]
    fn status_parses_case_insensitively() {
        assert_eq!("  DONE ".parse::<TaskStatus>().unwrap(), TaskStatus::Done);
        assert!("finished".parse::<TaskStatus>().is_err());
    }

    // -----------------------------------------------------------------------
    // Reconciliation
    // -----------------------------------------------------------------------

    #[test]
    fn progress_hundred_stamps_completion() {
        let state = reconcile(
            TaskState::default(),
            TaskChange {
                progress: Some(100),
                status: None,
            },
            now(),
        )
        .unwrap();
        assert_eq!(state.status, TaskStatus::Done);
        assert_eq!(state.completed_at, Some(now()));
    }

    #[test]
    fn existing_completion_time_is_kept() {
        let earlier = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let current = TaskState {
            status: TaskStatus::Done,
            progress: 100,
            completed_at: Some(earlier),
        };
        let state = reconcile(
            current,
            TaskChange {
                status: Some(TaskStatus::Done),
                progress: None,
            },
            now(),
        )
        .unwrap();
        assert_eq!(state.completed_at, Some(earlier));
    }

    #[test]
    fn reopening_clears_completion() {
        let current = TaskState {
            status: TaskStatus::Done,
            progress: 100,
            completed_at: Some(now()),
        };
        let state = reconcile(
            current,
            TaskChange {
                progress: Some(60),
                status: None,
            },
            now(),
        )
        .unwrap();
        assert_eq!(state.status, TaskStatus::Doing);
        assert_eq!(state.completed_at, None);
    }

    #[test]
    fn blocked_survives_progress_edits_below_hundred() {
        let current = TaskState {
            status: TaskStatus::Blocked,
            progress: 20,
            completed_at: None,
        };
        let state = reconcile(
            current,
            TaskChange {
                progress: Some(40),
                status: None,
            },
            now(),
        )
        .unwrap();
        assert_eq!(state.status, TaskStatus::Blocked);
        assert_eq!(state.progress, 40);
    }

    #[test]
    fn blocked_task_completes_at_hundred() {
        let current = TaskState {
            status: TaskStatus::Blocked,
            progress: 90,
            completed_at: None,
        };
        let state = reconcile(
            current,
            TaskChange {
                progress: Some(100),
                status: None,
            },
            now(),
        )
        .unwrap();
        assert_eq!(state.status, TaskStatus::Done);
        assert!(state.completed_at.is_some());
    }

    #[test]
    fn explicit_status_overrides_blocked() {
        let current = TaskState {
            status: TaskStatus::Blocked,
            progress: 30,
            completed_at: None,
        };
        let state = reconcile(
            current,
            TaskChange {
                progress: Some(30),
                status: Some(TaskStatus::Doing),
            },
            now(),
        )
        .unwrap();
        assert_eq!(state.status, TaskStatus::Doing);
    }

    #[test]
    fn move_pulls_progress_into_band() {
        let current = TaskState::default();

        let doing = reconcile(
            current,
            TaskChange {
                status: Some(TaskStatus::Doing),
                progress: None,
            },
            now(),
        )
        .unwrap();
        assert_eq!(doing.progress, 1);

        let done = reconcile(
            doing,
            TaskChange {
                status: Some(TaskStatus::Done),
                progress: None,
            },
            now(),
        )
        .unwrap();
        assert_eq!(done.progress, 100);
        assert!(done.completed_at.is_some());

        let blocked = reconcile(
            done,
            TaskChange {
                status: Some(TaskStatus::Blocked),
                progress: None,
            },
            now(),
        )
        .unwrap();
        assert_eq!(blocked.progress, 99);
        assert_eq!(blocked.completed_at, None);

        let todo = reconcile(
            blocked,
            TaskChange {
                status: Some(TaskStatus::Todo),
                progress: None,
            },
            now(),
        )
        .unwrap();
        assert_eq!(todo.progress, 0);
    }

    #[test]
    fn invalid_progress_fails_reconcile() {
        let result = reconcile(
            TaskState::default(),
            TaskChange {
                progress: Some(150),
                status: None,
            },
            now(),
        );
        assert_matches!(result, Err(CoreError::Validation(_)));
    }
}
