//! Gantt timeline: effective date resolution and the view model handed to the
//! timeline renderer.
//!
//! Tasks are rarely fully dated. Each bar therefore falls back through the
//! fields that are populated:
//!
//! - start: `start_date` -> `created_at` -> today
//! - end: `end_date` -> `completed_at` -> `due_date` -> start + 1 day

use std::collections::BTreeSet;

use chrono::Days;
use serde::Serialize;

use crate::dependencies::{finish_to_start_edges, to_csv, DependencyEdge};
use crate::task_status::TaskStatus;
use crate::types::{Date, DbId, Timestamp};

/// Date-bearing fields of a task, as stored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaskDates {
    pub start_date: Option<Date>,
    pub end_date: Option<Date>,
    pub due_date: Option<Date>,
    pub completed_at: Option<Timestamp>,
    pub created_at: Option<Timestamp>,
}

/// Effective start and end of a timeline bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateSpan {
    pub start: Date,
    pub end: Date,
}

/// Resolve the effective start date.
pub fn effective_start(dates: &TaskDates, today: Date) -> Date {
    dates
        .start_date
        .or_else(|| dates.created_at.map(|t| t.date_naive()))
        .unwrap_or(today)
}

/// Resolve the effective end date given an already-resolved start.
///
/// The end is not clamped against the start: a due date that precedes the
/// creation date is shown as-is.
pub fn effective_end(dates: &TaskDates, start: Date) -> Date {
    dates
        .end_date
        .or_else(|| dates.completed_at.map(|t| t.date_naive()))
        .or(dates.due_date)
        .unwrap_or_else(|| start.checked_add_days(Days::new(1)).unwrap_or(start))
}

/// Resolve both ends of a task's bar. Always produces a value.
pub fn resolve_span(dates: &TaskDates, today: Date) -> DateSpan {
    let start = effective_start(dates, today);
    DateSpan {
        start,
        end: effective_end(dates, start),
    }
}

// ---------------------------------------------------------------------------
// View model
// ---------------------------------------------------------------------------

/// Everything the timeline needs to know about one task.
#[derive(Debug, Clone)]
pub struct TimelineTask {
    pub id: DbId,
    pub title: String,
    pub status: TaskStatus,
    pub progress: i32,
    pub priority: i32,
    pub room_id: Option<DbId>,
    pub dates: TaskDates,
    pub depends_on: Vec<DbId>,
}

/// One bar on the Gantt chart.
#[derive(Debug, Clone, Serialize)]
pub struct GanttBar {
    pub id: DbId,
    pub name: String,
    pub start: Date,
    pub end: Date,
    pub progress: i32,
    pub status: TaskStatus,
    pub priority: i32,
    pub room_id: Option<DbId>,
    pub depends_on: Vec<DbId>,
    /// Same prerequisites as `depends_on`, as the CSV string most Gantt
    /// widgets expect.
    pub dependencies: String,
}

/// The full Gantt payload: bars plus finish-to-start edges.
#[derive(Debug, Clone, Serialize)]
pub struct GanttView {
    pub tasks: Vec<GanttBar>,
    pub edges: Vec<DependencyEdge>,
}

/// Build the Gantt view for a project's tasks.
///
/// Bars are ordered by resolved start date, then id. Edges only connect
/// tasks that are present in `tasks`.
pub fn build_gantt(tasks: &[TimelineTask], today: Date) -> GanttView {
    let edges = finish_to_start_edges(
        tasks
            .iter()
            .map(|t| (t.id, t.depends_on.as_slice())),
    );

    let mut bars: Vec<GanttBar> = tasks
        .iter()
        .map(|t| {
            let span = resolve_span(&t.dates, today);
            let deps: BTreeSet<DbId> = edges
                .iter()
                .filter(|e| e.to == t.id)
                .map(|e| e.from)
                .collect();
            GanttBar {
                id: t.id,
                name: t.title.clone(),
                start: span.start,
                end: span.end,
                progress: t.progress,
                status: t.status,
                priority: t.priority,
                room_id: t.room_id,
                dependencies: to_csv(&deps),
                depends_on: deps.into_iter().collect(),
            }
        })
        .collect();
    bars.sort_by_key(|b| (b.start, b.id));

    GanttView { tasks: bars, edges }
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, TimeZone, Utc};

    use super::*;

    fn d(y: i32, m: u32, day: u32) -> Date {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn today() -> Date {
        d(2025, 6, 1)
    }

    // -----------------------------------------------------------------------
    // Start fallbacks
    // -----------------------------------------------------------------------

    #[test]
    fn start_prefers_start_date() {
        let dates = TaskDates {
            start_date: Some(d(2025, 4, 2)),
            created_at: Some(Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap()),
            ..Default::default()
        };
        assert_eq!(effective_start(&dates, today()), d(2025, 4, 2));
    }

    #[test]
    fn start_falls_back_to_created_at() {
        let dates = TaskDates {
            created_at: Some(Utc.with_ymd_and_hms(2025, 3, 1, 23, 59, 0).unwrap()),
            ..Default::default()
        };
        assert_eq!(effective_start(&dates, today()), d(2025, 3, 1));
    }

    #[test]
    fn start_falls_back_to_today() {
        assert_eq!(effective_start(&TaskDates::default(), today()), today());
    }

    // -----------------------------------------------------------------------
    // End fallbacks
    // -----------------------------------------------------------------------

    #[test]
    fn end_prefers_end_date() {
        let dates = TaskDates {
            end_date: Some(d(2025, 7, 1)),
            due_date: Some(d(2025, 8, 1)),
            completed_at: Some(Utc.with_ymd_and_hms(2025, 6, 20, 8, 0, 0).unwrap()),
            ..Default::default()
        };
        assert_eq!(resolve_span(&dates, today()).end, d(2025, 7, 1));
    }

    #[test]
    fn end_uses_completion_before_due_date() {
        let dates = TaskDates {
            due_date: Some(d(2025, 8, 1)),
            completed_at: Some(Utc.with_ymd_and_hms(2025, 6, 20, 8, 0, 0).unwrap()),
            ..Default::default()
        };
        assert_eq!(resolve_span(&dates, today()).end, d(2025, 6, 20));
    }

    #[test]
    fn only_due_date_sets_end() {
        let dates = TaskDates {
            due_date: Some(d(2025, 6, 15)),
            ..Default::default()
        };
        let span = resolve_span(&dates, today());
        assert_eq!(span.start, today());
        assert_eq!(span.end, d(2025, 6, 15));
    }

    #[test]
    fn nothing_set_spans_one_day() {
        let span = resolve_span(&TaskDates::default(), today());
        assert_eq!(span.start, today());
        assert_eq!(span.end, d(2025, 6, 2));
    }

    #[test]
    fn one_day_default_follows_explicit_start() {
        let dates = TaskDates {
            start_date: Some(d(2025, 12, 31)),
            ..Default::default()
        };
        assert_eq!(resolve_span(&dates, today()).end, d(2026, 1, 1));
    }

    // -----------------------------------------------------------------------
    // View model
    // -----------------------------------------------------------------------

    fn task(id: DbId, start: Option<Date>, depends_on: Vec<DbId>) -> TimelineTask {
        TimelineTask {
            id,
            title: format!("Task {id}"),
            status: TaskStatus::Todo,
            progress: 0,
            priority: 3,
            room_id: None,
            dates: TaskDates {
                start_date: start,
                ..Default::default()
            },
            depends_on,
        }
    }

    #[test]
    fn gantt_orders_bars_by_start() {
        let tasks = vec![
            task(1, Some(d(2025, 5, 10)), vec![]),
            task(2, Some(d(2025, 5, 1)), vec![]),
        ];
        let view = build_gantt(&tasks, today());
        let ids: Vec<DbId> = view.tasks.iter().map(|b| b.id).collect();
        assert_eq!(ids, vec![2, 1]);
    }

    #[test]
    fn gantt_edges_skip_tasks_outside_view() {
        let tasks = vec![
            task(1, Some(d(2025, 5, 1)), vec![]),
            task(2, Some(d(2025, 5, 2)), vec![1, 77]),
        ];
        let view = build_gantt(&tasks, today());
        assert_eq!(view.edges.len(), 1);
        assert_eq!(view.edges[0].from, 1);
        assert_eq!(view.edges[0].to, 2);

        let bar = view.tasks.iter().find(|b| b.id == 2).unwrap();
        assert_eq!(bar.depends_on, vec![1]);
        assert_eq!(bar.dependencies, "1");
    }
}
