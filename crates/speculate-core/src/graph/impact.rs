//! Downstream impact of finishing a task.
//!
//! `impact_of(id)` answers "if I complete `id` now, what opens up?" without
//! touching the graph: it walks forward along `blocks` edges and re-derives
//! each pending task's status under the hypothesis that `id` is done.

#![allow(clippy::must_use_candidate, clippy::module_name_repetitions)]

use std::collections::{HashSet, VecDeque};

use serde::Serialize;

use super::blocking::BlockingIndex;
use super::status::derive_from;
use crate::error::StateError;
use crate::model::{DerivedStatus, Graph, Task, TaskStatus};

/// Result of a hypothetical completion.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Impact {
    /// The task assumed complete.
    pub task: String,
    /// Pending tasks that go from blocked to ready, in traversal order.
    pub unblocked: Vec<String>,
    /// Pending downstream tasks still blocked by something else.
    pub still_blocked: Vec<String>,
}

impl Impact {
    pub fn is_empty(&self) -> bool {
        self.unblocked.is_empty() && self.still_blocked.is_empty()
    }
}

/// Every task reachable from `id` along `blocks` edges, breadth-first.
///
/// `id` itself is not included. Endpoints that are not tasks are skipped.
///
/// # Errors
///
/// [`StateError::NotFound`] if `id` is not a task.
pub fn downstream(id: &str, graph: &Graph) -> Result<Vec<String>, StateError> {
    if !graph.contains(id) {
        return Err(StateError::NotFound { id: id.to_string() });
    }
    let index = BlockingIndex::build(graph);
    Ok(reachable(id, graph, &index))
}

fn reachable(id: &str, graph: &Graph, index: &BlockingIndex) -> Vec<String> {
    let mut order = Vec::new();
    let mut visited: HashSet<&str> = HashSet::from([id]);
    let mut queue: VecDeque<&str> = VecDeque::from([id]);

    while let Some(current) = queue.pop_front() {
        for next in index.blocks(current) {
            if graph.contains(next) && visited.insert(next.as_str()) {
                order.push(next.clone());
                queue.push_back(next.as_str());
            }
        }
    }
    order
}

/// Compute what completing `id` would unblock.
///
/// Only tasks with stored status `pending` are reported. Each downstream
/// task is visited once, so shared descendants appear once. The graph is
/// borrowed immutably; stored statuses never change.
///
/// # Errors
///
/// [`StateError::NotFound`] if `id` is not a task.
pub fn impact_of(id: &str, graph: &Graph) -> Result<Impact, StateError> {
    if !graph.contains(id) {
        return Err(StateError::NotFound { id: id.to_string() });
    }

    let index = BlockingIndex::build(graph);
    let mut impact = Impact {
        task: id.to_string(),
        ..Impact::default()
    };

    let done_now = |b: &str| graph.task(b).is_some_and(Task::is_complete);
    let done_after = |b: &str| b == id || done_now(b);

    for task_id in reachable(id, graph, &index) {
        let Some(task) = graph.task(&task_id) else {
            continue;
        };
        if task.status != TaskStatus::Pending {
            continue;
        }

        let blockers = || index.blockers(&task_id).iter().map(String::as_str);
        let before = derive_from(task, blockers(), done_now);
        let after = derive_from(task, blockers(), done_after);

        match (before, after) {
            (DerivedStatus::Blocked, DerivedStatus::Ready) => impact.unblocked.push(task_id),
            (_, DerivedStatus::Blocked) => impact.still_blocked.push(task_id),
            _ => {}
        }
    }

    tracing::debug!(
        task = id,
        unblocked = impact.unblocked.len(),
        still_blocked = impact.still_blocked.len(),
        "computed impact"
    );
    Ok(impact)
}
