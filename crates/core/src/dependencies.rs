//! Finish-to-start dependency linking.
//!
//! Dependencies arrive as a CSV list of task ids (`"12, 15;19"`). Linking keeps
//! only ids that name another task in the same project.

use std::collections::{BTreeSet, HashSet};

use serde::Serialize;

use crate::types::DbId;

/// Outcome of linking a dependency list against the project's tasks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkOutcome {
    /// Ids that will be stored as prerequisites.
    pub linked: BTreeSet<DbId>,
    /// Tokens that were discarded (unparseable, unknown, or self-referential).
    pub dropped: Vec<String>,
}

/// Split a CSV dependency list into trimmed, non-empty tokens.
///
/// Both `,` and `;` separate entries.
fn tokens(csv: &str) -> impl Iterator<Item = &str> {
    csv.split([',', ';'])
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Parse a CSV id list, ignoring anything that is not an integer.
pub fn parse_id_csv(csv: &str) -> BTreeSet<DbId> {
    tokens(csv).filter_map(|t| t.parse().ok()).collect()
}

/// Resolve a CSV dependency list for task `task_id` against `project_tasks`.
///
/// `task_id` is `None` while the task is being created. Unknown ids and
/// self-references are dropped silently and reported in [`LinkOutcome::dropped`].
pub fn link_dependencies(
    csv: &str,
    task_id: Option<DbId>,
    project_tasks: &HashSet<DbId>,
) -> LinkOutcome {
    let mut outcome = LinkOutcome::default();
    for token in tokens(csv) {
        match token.parse::<DbId>() {
            Ok(id) if Some(id) != task_id && project_tasks.contains(&id) => {
                outcome.linked.insert(id);
            }
            _ => outcome.dropped.push(token.to_string()),
        }
    }
    outcome
}

/// Render a dependency set back to its canonical CSV form (ascending ids).
pub fn to_csv(ids: &BTreeSet<DbId>) -> String {
    ids.iter()
        .map(DbId::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

// ---------------------------------------------------------------------------
// Edges
// ---------------------------------------------------------------------------

/// Kind of scheduling edge. Only finish-to-start is modelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeKind {
    FinishToStart,
}

/// A timeline edge: `to` cannot start until `from` finishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DependencyEdge {
    pub from: DbId,
    pub to: DbId,
    pub kind: EdgeKind,
}

/// Build finish-to-start edges from `(task_id, prerequisites)` pairs.
///
/// Edges whose prerequisite is not in the task set are skipped, so a stale
/// dependency row never produces a dangling edge.
pub fn finish_to_start_edges<'a, I>(tasks: I) -> Vec<DependencyEdge>
where
    I: IntoIterator<Item = (DbId, &'a [DbId])>,
{
    let pairs: Vec<(DbId, &[DbId])> = tasks.into_iter().collect();
    let known: HashSet<DbId> = pairs.iter().map(|(id, _)| *id).collect();
    let known = &known;

    let mut edges: Vec<DependencyEdge> = pairs
        .iter()
        .flat_map(|&(task_id, deps)| {
            deps.iter()
                .copied()
                .filter(move |dep| *dep != task_id && known.contains(dep))
                .map(move |dep| DependencyEdge {
                    from: dep,
                    to: task_id,
                    kind: EdgeKind::FinishToStart,
                })
        })
        .collect();
    edges.sort_by_key(|e| (e.to, e.from));
    edges.dedup();
    edges
}
