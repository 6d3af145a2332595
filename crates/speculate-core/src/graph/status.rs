//! Derived status: what a task looks like to someone picking up work.
//!
//! Stored status says what the user recorded. Derived status adds the graph:
//! a `pending` task whose blockers are not all `done` shows as `blocked`.
//!
//! | stored        | blockers all done | derived       |
//! |---------------|-------------------|---------------|
//! | `done`        | any               | `done`        |
//! | `in_progress` | any               | `in-progress` |
//! | `pending`     | yes               | `ready`       |
//! | `pending`     | no                | `blocked`     |
//!
//! A blocker id that does not resolve to a task counts as not done.

#![allow(clippy::must_use_candidate)]

use std::collections::BTreeMap;

use super::blocking::BlockingIndex;
use crate::model::{DerivedStatus, Graph, Task, TaskStatus};

/// Derive the status of `task` within `graph`.
///
/// Scans the relationship list; use [`derive_with_index`] when deriving
/// many tasks against the same graph.
pub fn derive_status(task: &Task, graph: &Graph) -> DerivedStatus {
    derive_from(task, graph.blockers_of(&task.id), |id| is_done(graph, id))
}

/// Derive the status of `task` using a prebuilt [`BlockingIndex`].
///
/// O(in-degree of `task`).
pub fn derive_with_index(task: &Task, graph: &Graph, index: &BlockingIndex) -> DerivedStatus {
    derive_from(
        task,
        index.blockers(&task.id).iter().map(String::as_str),
        |id| is_done(graph, id),
    )
}

/// Derived status of every task, keyed by id. O(V+E).
pub fn derive_all(graph: &Graph) -> BTreeMap<String, DerivedStatus> {
    let index = BlockingIndex::build(graph);
    graph
        .tasks
        .values()
        .map(|task| (task.id.clone(), derive_with_index(task, graph, &index)))
        .collect()
}

/// Shared rule. `done` decides whether a blocker id counts as finished.
pub(crate) fn derive_from<'a>(
    task: &Task,
    mut blockers: impl Iterator<Item = &'a str>,
    done: impl Fn(&str) -> bool,
) -> DerivedStatus {
    match task.status {
        TaskStatus::Done => DerivedStatus::Done,
        TaskStatus::InProgress => DerivedStatus::InProgress,
        TaskStatus::Pending => {
            if blockers.all(done) {
                DerivedStatus::Ready
            } else {
                DerivedStatus::Blocked
            }
        }
    }
}

fn is_done(graph: &Graph, id: &str) -> bool {
    graph.task(id).is_some_and(Task::is_complete)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{RelationType, Relationship};

    fn graph(tasks: &[(&str, TaskStatus)], rels: &[Relationship]) -> Graph {
        let mut g = Graph::new();
        for (id, status) in tasks {
            g.tasks
                .insert((*id).to_string(), Task::new(*id).with_status(*status));
        }
        for rel in rels {
            g.push_relationship(rel.clone());
        }
        g
    }

    fn status_of(g: &Graph, id: &str) -> DerivedStatus {
        derive_status(g.task(id).unwrap(), g)
    }

    #[test]
    fn isolated_pending_task_is_ready() {
        let g = graph(&[("a", TaskStatus::Pending)], &[]);
        assert_eq!(status_of(&g, "a"), DerivedStatus::Ready);
    }

    #[test]
    fn pending_with_unfinished_blocker_is_blocked() {
        let g = graph(
            &[("a", TaskStatus::Pending), ("b", TaskStatus::Pending)],
            &[Relationship::blocks("a", "b")],
        );
        assert_eq!(status_of(&g, "a"), DerivedStatus::Ready);
        assert_eq!(status_of(&g, "b"), DerivedStatus::Blocked);
    }

    #[test]
    fn in_progress_blocker_still_blocks() {
        let g = graph(
            &[("a", TaskStatus::InProgress), ("b", TaskStatus::Pending)],
            &[Relationship::blocks("a", "b")],
        );
        assert_eq!(status_of(&g, "a"), DerivedStatus::InProgress);
        assert_eq!(status_of(&g, "b"), DerivedStatus::Blocked);
    }

    #[test]
    fn all_blockers_done_makes_ready() {
        let g = graph(
            &[
                ("a", TaskStatus::Done),
                ("b", TaskStatus::Done),
                ("c", TaskStatus::Pending),
            ],
            &[Relationship::blocks("a", "c"), Relationship::blocks("b", "c")],
        );
        assert_eq!(status_of(&g, "c"), DerivedStatus::Ready);
    }

    #[test]
    fn stored_status_wins_over_blockers() {
        // Manually corrected states are reported as stored.
        let g = graph(
            &[
                ("a", TaskStatus::Pending),
                ("b", TaskStatus::InProgress),
                ("c", TaskStatus::Done),
            ],
            &[Relationship::blocks("a", "b"), Relationship::blocks("a", "c")],
        );
        assert_eq!(status_of(&g, "b"), DerivedStatus::InProgress);
        assert_eq!(status_of(&g, "c"), DerivedStatus::Done);
    }

    #[test]
    fn informational_edges_never_block() {
        let g = graph(
            &[("a", TaskStatus::Pending), ("b", TaskStatus::Pending)],
            &[
                Relationship::new("a", "b", RelationType::RelatesTo),
                Relationship::new("a", "b", RelationType::PartOf),
            ],
        );
        assert_eq!(status_of(&g, "b"), DerivedStatus::Ready);
    }

    #[test]
    fn dangling_blocker_counts_as_not_done() {
        let mut g = graph(&[("b", TaskStatus::Pending)], &[]);
        g.relationships.push(Relationship::blocks("ghost", "b"));
        assert_eq!(status_of(&g, "b"), DerivedStatus::Blocked);
    }

    #[test]
    fn derive_all_matches_per_task_derivation() {
        let g = graph(
            &[
                ("a", TaskStatus::Done),
                ("b", TaskStatus::Pending),
                ("c", TaskStatus::Pending),
                ("d", TaskStatus::InProgress),
            ],
            &[
                Relationship::blocks("a", "b"),
                Relationship::blocks("b", "c"),
                Relationship::new("c", "d", RelationType::RelatesTo),
            ],
        );
        let all = derive_all(&g);
        assert_eq!(all.len(), 4);
        for (id, status) in &all {
            assert_eq!(*status, status_of(&g, id), "{id}");
        }
        assert_eq!(all["b"], DerivedStatus::Ready);
        assert_eq!(all["c"], DerivedStatus::Blocked);
    }
}
