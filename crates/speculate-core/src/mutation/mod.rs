//! Mutation engine: every write to the task graph goes through here.
//!
//! Each operation is all-or-nothing. Work happens on a staged copy (or is
//! fully validated before the first write) and the caller's [`Graph`] is
//! replaced only on success, so a rejected batch leaves it untouched.
//!
//! Persistence is not this module's concern; wrap calls in
//! [`GraphStore::transact`](crate::store::GraphStore::transact) to load,
//! mutate and save under the store lock.

#![allow(clippy::module_name_repetitions)]

pub mod request;

use std::collections::{BTreeSet, HashSet};

use serde::Serialize;
use tracing::{debug, info};

use crate::error::{MissingEndpoint, Result, StateError, ValidationError};
use crate::graph::blocking::BlockingIndex;
use crate::graph::cycles::would_create_cycle;
use crate::graph::naming::check_task_id;
use crate::graph::status::derive_status;
use crate::model::{DerivedStatus, Graph, TaskStatus};

pub use request::{AddRequest, DeleteRequest, NewTask, RelationshipSelector, TaskPatch, UpdateRequest};

/// What an `add` committed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AddSummary {
    pub tasks_added: Vec<String>,
    pub relationships_added: usize,
    /// Relationships that already existed and were skipped.
    pub relationships_skipped: usize,
}

/// What an `update` committed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UpdateSummary {
    pub tasks_updated: Vec<String>,
}

/// What a `delete` committed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DeleteSummary {
    pub tasks_deleted: Vec<String>,
    pub relationships_removed: usize,
}

fn check_estimate(id: &str, estimate: Option<f64>) -> Result<()> {
    match estimate {
        Some(value) if value.is_nan() || value <= 0.0 => Err(ValidationError::InvalidEstimate {
            id: id.to_string(),
            value,
        }
        .into()),
        _ => Ok(()),
    }
}

/// Add a batch of tasks and relationships.
///
/// Relationship endpoints may refer to existing tasks or to tasks in the
/// same batch. Exact duplicate relationships are skipped. Each new `blocks`
/// edge is checked against the staged graph, so the first edge that would
/// close a loop rejects the whole batch.
///
/// # Errors
///
/// - [`ValidationError::NamingRule`] for an ill-formed id
/// - [`StateError::DuplicateTask`] for an id already in the graph or repeated in the batch
/// - [`ValidationError::InvalidEstimate`] for a non-positive estimate
/// - [`ValidationError::SelfLoop`] for `from == to`
/// - [`ValidationError::DanglingEndpoint`] for an unknown endpoint
/// - [`ValidationError::Cycle`] for a `blocks` edge that closes a cycle
pub fn add(graph: &mut Graph, request: AddRequest) -> Result<AddSummary> {
    let mut staged = graph.clone();
    let mut summary = AddSummary::default();

    for new_task in request.tasks {
        check_task_id(&new_task.id).map_err(|violation| ValidationError::NamingRule {
            id: new_task.id.clone(),
            reason: violation.to_string(),
        })?;
        if staged.contains(&new_task.id) {
            return Err(StateError::DuplicateTask { id: new_task.id }.into());
        }
        check_estimate(&new_task.id, new_task.estimate_hours)?;

        debug!(id = %new_task.id, "staging task");
        summary.tasks_added.push(new_task.id.clone());
        staged.tasks.insert(new_task.id.clone(), new_task.into_task());
    }

    let mut index = BlockingIndex::build(&staged);
    for rel in request.relationships {
        if rel.is_self_loop() {
            return Err(ValidationError::SelfLoop {
                id: rel.from,
                kind: rel.kind.to_string(),
            }
            .into());
        }

        let missing = match (staged.contains(&rel.from), staged.contains(&rel.to)) {
            (true, true) => None,
            (false, true) => Some(MissingEndpoint::Source),
            (true, false) => Some(MissingEndpoint::Target),
            (false, false) => Some(MissingEndpoint::Both),
        };
        if let Some(missing) = missing {
            return Err(ValidationError::DanglingEndpoint {
                from: rel.from,
                to: rel.to,
                missing,
            }
            .into());
        }

        if staged.has_relationship(&rel) {
            debug!(%rel, "relationship already present");
            summary.relationships_skipped += 1;
            continue;
        }

        if rel.is_blocking() {
            if let Some(cycle) = would_create_cycle(&index, &rel.from, &rel.to) {
                return Err(ValidationError::Cycle { cycle }.into());
            }
            index.insert(&rel.from, &rel.to);
        }

        debug!(%rel, "staging relationship");
        staged.relationships.push(rel);
        summary.relationships_added += 1;
    }

    *graph = staged;
    info!(
        tasks = summary.tasks_added.len(),
        relationships = summary.relationships_added,
        skipped = summary.relationships_skipped,
        "add committed"
    );
    Ok(summary)
}

/// Merge field patches into existing tasks.
///
/// Every patch is checked before any is applied.
///
/// # Errors
///
/// - [`StateError::NotFound`] for an unknown id
/// - [`StateError::ImmutableField`] when `new_id` differs from `id`
/// - [`ValidationError::InvalidEstimate`] for a non-positive estimate
pub fn update(graph: &mut Graph, request: UpdateRequest) -> Result<UpdateSummary> {
    for patch in &request.tasks {
        if !graph.contains(&patch.id) {
            return Err(StateError::NotFound {
                id: patch.id.clone(),
            }
            .into());
        }
        if patch.new_id.as_ref().is_some_and(|new_id| *new_id != patch.id) {
            return Err(StateError::ImmutableField {
                id: patch.id.clone(),
                field: "id",
            }
            .into());
        }
        check_estimate(&patch.id, patch.estimate_hours)?;
    }

    let mut summary = UpdateSummary::default();
    for patch in &request.tasks {
        if let Some(task) = graph.task_mut(&patch.id) {
            patch.apply(task);
            debug!(id = %patch.id, "patched task");
            if !summary.tasks_updated.contains(&patch.id) {
                summary.tasks_updated.push(patch.id.clone());
            }
        }
    }

    info!(tasks = summary.tasks_updated.len(), "update committed");
    Ok(summary)
}

/// Remove relationships and tasks.
///
/// Relationship selectors are applied first; selectors that match nothing
/// are ignored. A task can only be deleted when every remaining relationship
/// touching it connects to another task in the same deletion set or to an id
/// that is not a task at all. Those relationships go away with the tasks.
///
/// # Errors
///
/// - [`StateError::NotFound`] for an unknown task id
/// - [`StateError::HasDependents`] when a relationship would be left dangling
pub fn delete(graph: &mut Graph, request: DeleteRequest) -> Result<DeleteSummary> {
    let mut staged = graph.clone();
    let mut summary = DeleteSummary::default();

    let before = staged.relationships.len();
    staged
        .relationships
        .retain(|rel| !request.relationships.iter().any(|sel| sel.matches(rel)));
    summary.relationships_removed = before - staged.relationships.len();
    debug!(removed = summary.relationships_removed, "removed selected relationships");

    let doomed: BTreeSet<&str> = request.tasks.iter().map(String::as_str).collect();
    for id in &doomed {
        if !staged.contains(id) {
            return Err(StateError::NotFound { id: (*id).to_string() }.into());
        }
    }

    // An outside endpoint that is not a task is already broken; that
    // relationship goes with the deleted task instead of blocking it.
    let crossing = staged.relationships.iter().find_map(|rel| {
        match (doomed.contains(rel.from.as_str()), doomed.contains(rel.to.as_str())) {
            (true, false) if staged.contains(&rel.to) => Some((&rel.from, &rel.to)),
            (false, true) if staged.contains(&rel.from) => Some((&rel.to, &rel.from)),
            _ => None,
        }
    });
    if let Some((inside, other)) = crossing {
        return Err(StateError::HasDependents {
            id: inside.clone(),
            other: other.clone(),
        }
        .into());
    }

    let before = staged.relationships.len();
    staged.relationships.retain(|rel| {
        !doomed.contains(rel.from.as_str()) && !doomed.contains(rel.to.as_str())
    });
    summary.relationships_removed += before - staged.relationships.len();

    let mut seen = HashSet::new();
    for id in &request.tasks {
        if seen.insert(id.as_str()) {
            staged.tasks.remove(id);
            summary.tasks_deleted.push(id.clone());
        }
    }

    *graph = staged;
    info!(
        tasks = summary.tasks_deleted.len(),
        relationships = summary.relationships_removed,
        "delete committed"
    );
    Ok(summary)
}

/// Move a ready task to in-progress.
///
/// # Errors
///
/// - [`StateError::NotFound`] for an unknown id
/// - [`StateError::NotReady`] unless the derived status is `ready`
pub fn start(graph: &mut Graph, id: &str) -> Result<DerivedStatus> {
    let status = graph
        .task(id)
        .map(|task| derive_status(task, graph))
        .ok_or_else(|| StateError::NotFound { id: id.to_string() })?;

    if status != DerivedStatus::Ready {
        return Err(StateError::NotReady {
            id: id.to_string(),
            status,
        }
        .into());
    }

    if let Some(task) = graph.task_mut(id) {
        task.status = TaskStatus::InProgress;
    }
    info!(id, "task started");
    Ok(DerivedStatus::InProgress)
}

/// Mark a task done, from either `pending` or `in_progress`.
///
/// Completing straight from `pending` is allowed for manual corrections and
/// does not check blockers.
///
/// # Errors
///
/// - [`StateError::NotFound`] for an unknown id
/// - [`StateError::AlreadyDone`] if the task is already done
pub fn complete(graph: &mut Graph, id: &str) -> Result<DerivedStatus> {
    let task = graph
        .task_mut(id)
        .ok_or_else(|| StateError::NotFound { id: id.to_string() })?;

    if task.status == TaskStatus::Done {
        return Err(StateError::AlreadyDone { id: id.to_string() }.into());
    }

    task.status = TaskStatus::Done;
    info!(id, "task completed");
    Ok(DerivedStatus::Done)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EngineError;
    use crate::model::{RelationType, Relationship};

    fn add_json(graph: &mut Graph, json: &str) -> Result<AddSummary> {
        add(graph, request::from_json(json)?)
    }

    fn abc() -> Graph {
        let mut graph = Graph::new();
        add_json(
            &mut graph,
            r#"{"tasks":[{"id":"a"},{"id":"b"},{"id":"c"}],
                "relationships":[{"from":"a","to":"b","type":"blocks"},
                                 {"from":"b","to":"c","type":"blocks"}]}"#,
        )
        .unwrap();
        graph
    }

    // -----------------------------------------------------------------------
    // add
    // -----------------------------------------------------------------------

    #[test]
    fn add_commits_tasks_and_relationships() {
        let mut graph = Graph::new();
        let summary = add_json(
            &mut graph,
            r#"{"tasks":[{"id":"a"},{"id":"b"}],
                "relationships":[{"from":"a","to":"b","type":"blocks"}]}"#,
        )
        .unwrap();
        assert_eq!(summary.tasks_added, ["a", "b"]);
        assert_eq!(summary.relationships_added, 1);
        assert_eq!(graph.len(), 2);
    }

    #[test]
    fn add_duplicate_in_batch_leaves_graph_empty() {
        let mut graph = Graph::new();
        let err = add_json(&mut graph, r#"{"tasks":[{"id":"x-y"},{"id":"x-y"}]}"#).unwrap_err();
        assert!(matches!(err, EngineError::State(StateError::DuplicateTask { ref id }) if id == "x-y"));
        assert!(graph.is_empty());
    }

    #[test]
    fn add_existing_id_is_duplicate() {
        let mut graph = abc();
        let err = add_json(&mut graph, r#"{"tasks":[{"id":"a"}]}"#).unwrap_err();
        assert!(matches!(err, EngineError::State(StateError::DuplicateTask { .. })));
    }

    #[test]
    fn add_rejects_bad_names_and_estimates() {
        let mut graph = Graph::new();
        let err = add_json(&mut graph, r#"{"tasks":[{"id":"Build And Test"}]}"#).unwrap_err();
        assert!(matches!(err, EngineError::Validation(ValidationError::NamingRule { .. })));

        let err = add_json(&mut graph, r#"{"tasks":[{"id":"a","estimate_hours":0}]}"#).unwrap_err();
        assert!(matches!(err, EngineError::Validation(ValidationError::InvalidEstimate { .. })));
        assert!(graph.is_empty());
    }

    #[test]
    fn add_rejects_self_loop_of_any_type() {
        let mut graph = abc();
        let before = graph.clone();
        let err = add_json(
            &mut graph,
            r#"{"relationships":[{"from":"a","to":"a","type":"relates_to"}]}"#,
        )
        .unwrap_err();
        assert!(matches!(err, EngineError::Validation(ValidationError::SelfLoop { .. })));
        assert_eq!(graph, before);
    }

    #[test]
    fn add_rejects_dangling_endpoint() {
        let mut graph = abc();
        let err = add_json(
            &mut graph,
            r#"{"tasks":[{"id":"d"}],
                "relationships":[{"from":"d","to":"ghost","type":"blocks"}]}"#,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            EngineError::Validation(ValidationError::DanglingEndpoint {
                missing: MissingEndpoint::Target,
                ..
            })
        ));
        assert!(!graph.contains("d"));
    }

    #[test]
    fn add_cycle_rejects_whole_batch() {
        let mut graph = abc();
        let before = graph.clone();
        let err = add_json(
            &mut graph,
            r#"{"tasks":[{"id":"d"}],
                "relationships":[{"from":"c","to":"d","type":"blocks"},
                                 {"from":"c","to":"a","type":"blocks"}]}"#,
        )
        .unwrap_err();
        match err {
            EngineError::Validation(ValidationError::Cycle { cycle }) => {
                assert_eq!(cycle, ["c", "a", "b", "c"]);
            }
            other => panic!("expected cycle error, got {other:?}"),
        }
        assert_eq!(graph, before);
    }

    #[test]
    fn add_cycle_within_batch_is_rejected() {
        let mut graph = Graph::new();
        let err = add_json(
            &mut graph,
            r#"{"tasks":[{"id":"a"},{"id":"b"}],
                "relationships":[{"from":"a","to":"b","type":"blocks"},
                                 {"from":"b","to":"a","type":"blocks"}]}"#,
        )
        .unwrap_err();
        assert_eq!(err.code(), crate::error::ErrorCode::CycleDetected);
        assert!(graph.is_empty());
    }

    #[test]
    fn informational_cycles_are_allowed() {
        let mut graph = abc();
        add_json(
            &mut graph,
            r#"{"relationships":[{"from":"c","to":"a","type":"relates_to"},
                                 {"from":"a","to":"c","type":"relates_to"},
                                 {"from":"c","to":"a","type":"part_of"}]}"#,
        )
        .unwrap();
        assert_eq!(graph.relationships.len(), 5);
    }

    #[test]
    fn re_adding_relationships_is_a_no_op() {
        let mut graph = abc();
        let before = graph.clone();
        let summary = add_json(
            &mut graph,
            r#"{"relationships":[{"from":"a","to":"b","type":"blocks"}]}"#,
        )
        .unwrap();
        assert_eq!(summary.relationships_added, 0);
        assert_eq!(summary.relationships_skipped, 1);
        assert_eq!(graph, before);
    }

    #[test]
    fn different_types_between_same_pair_coexist() {
        let mut graph = abc();
        add_json(
            &mut graph,
            r#"{"relationships":[{"from":"a","to":"b","type":"part_of"}]}"#,
        )
        .unwrap();
        assert!(graph.has_relationship(&Relationship::new("a", "b", RelationType::PartOf)));
        assert!(graph.has_relationship(&Relationship::blocks("a", "b")));
    }

    // -----------------------------------------------------------------------
    // update
    // -----------------------------------------------------------------------

    #[test]
    fn update_merges_fields() {
        let mut graph = abc();
        let summary = update(
            &mut graph,
            request::from_json(
                r#"{"tasks":[{"id":"a","description":"design it","estimate_hours":3,
                               "acceptance_criteria":["reviewed"]}]}"#,
            )
            .unwrap(),
        )
        .unwrap();
        assert_eq!(summary.tasks_updated, ["a"]);
        let task = graph.task("a").unwrap();
        assert_eq!(task.description, "design it");
        assert_eq!(task.estimate_hours, Some(3.0));
        assert_eq!(task.acceptance_criteria, ["reviewed"]);
    }

    #[test]
    fn update_unknown_id_changes_nothing() {
        let mut graph = abc();
        let before = graph.clone();
        let req = UpdateRequest {
            tasks: vec![
                TaskPatch {
                    description: Some("x".into()),
                    ..TaskPatch::new("a")
                },
                TaskPatch::new("nope"),
            ],
        };
        let err = update(&mut graph, req).unwrap_err();
        assert!(matches!(err, EngineError::State(StateError::NotFound { ref id }) if id == "nope"));
        assert_eq!(graph, before);
    }

    #[test]
    fn update_rejects_rename() {
        let mut graph = abc();
        let req = UpdateRequest {
            tasks: vec![TaskPatch {
                new_id: Some("z".into()),
                ..TaskPatch::new("a")
            }],
        };
        let err = update(&mut graph, req).unwrap_err();
        assert!(matches!(
            err,
            EngineError::State(StateError::ImmutableField { field: "id", .. })
        ));
        assert!(graph.contains("a"));
    }

    #[test]
    fn update_can_correct_status() {
        let mut graph = abc();
        let req = UpdateRequest {
            tasks: vec![TaskPatch {
                status: Some(TaskStatus::Done),
                ..TaskPatch::new("a")
            }],
        };
        update(&mut graph, req).unwrap();
        assert_eq!(
            derive_status(graph.task("b").unwrap(), &graph),
            DerivedStatus::Ready
        );
    }

    // -----------------------------------------------------------------------
    // delete
    // -----------------------------------------------------------------------

    #[test]
    fn delete_with_outside_dependent_is_rejected() {
        let mut graph = abc();
        let before = graph.clone();
        let err = delete(
            &mut graph,
            DeleteRequest {
                tasks: vec!["b".into()],
                ..DeleteRequest::default()
            },
        )
        .unwrap_err();
        assert!(matches!(err, EngineError::State(StateError::HasDependents { .. })));
        assert_eq!(graph, before);
    }

    #[test]
    fn delete_connected_set_together() {
        let mut graph = abc();
        let summary = delete(
            &mut graph,
            DeleteRequest {
                tasks: vec!["a".into(), "b".into(), "c".into()],
                ..DeleteRequest::default()
            },
        )
        .unwrap();
        assert_eq!(summary.tasks_deleted, ["a", "b", "c"]);
        assert_eq!(summary.relationships_removed, 2);
        assert!(graph.is_empty());
        assert!(graph.relationships.is_empty());
    }

    #[test]
    fn delete_after_removing_relationship_selector() {
        let mut graph = abc();
        let summary = delete(
            &mut graph,
            request::from_json(
                r#"{"tasks":["c"],"relationships":[{"from":"b","to":"c"},{"from":"x","to":"y"}]}"#,
            )
            .unwrap(),
        )
        .unwrap();
        assert_eq!(summary.tasks_deleted, ["c"]);
        assert_eq!(summary.relationships_removed, 1);
        assert_eq!(graph.relationships, [Relationship::blocks("a", "b")]);
    }

    #[test]
    fn delete_drops_relationships_to_missing_tasks() {
        // Hand-edited store: c is linked to ids that are not tasks.
        let mut graph = abc();
        graph.relationships.push(Relationship::blocks("c", "ghost"));
        graph
            .relationships
            .push(Relationship::new("phantom", "c", RelationType::RelatesTo));

        let summary = delete(
            &mut graph,
            request::from_json(r#"{"tasks":["c"],"relationships":[{"from":"b","to":"c"}]}"#)
                .unwrap(),
        )
        .unwrap();
        assert_eq!(summary.tasks_deleted, ["c"]);
        assert_eq!(summary.relationships_removed, 3);
        assert_eq!(graph.relationships, [Relationship::blocks("a", "b")]);
    }

    #[test]
    fn delete_still_names_the_real_dependent() {
        let mut graph = abc();
        graph.relationships.push(Relationship::blocks("b", "ghost"));
        let err = delete(
            &mut graph,
            DeleteRequest {
                tasks: vec!["b".into()],
                ..DeleteRequest::default()
            },
        )
        .unwrap_err();
        assert!(matches!(
            err,
            EngineError::State(StateError::HasDependents { ref other, .. }) if other == "a"
        ));
    }

    #[test]
    fn delete_unknown_task_is_not_found() {
        let mut graph = abc();
        let err = delete(
            &mut graph,
            DeleteRequest {
                tasks: vec!["nope".into()],
                ..DeleteRequest::default()
            },
        )
        .unwrap_err();
        assert!(matches!(err, EngineError::State(StateError::NotFound { .. })));
    }

    // -----------------------------------------------------------------------
    // start / complete
    // -----------------------------------------------------------------------

    #[test]
    fn start_requires_ready() {
        let mut graph = abc();
        let err = start(&mut graph, "b").unwrap_err();
        assert!(matches!(
            err,
            EngineError::State(StateError::NotReady {
                status: DerivedStatus::Blocked,
                ..
            })
        ));

        assert_eq!(start(&mut graph, "a").unwrap(), DerivedStatus::InProgress);
        let err = start(&mut graph, "a").unwrap_err();
        assert!(matches!(
            err,
            EngineError::State(StateError::NotReady {
                status: DerivedStatus::InProgress,
                ..
            })
        ));
    }

    #[test]
    fn complete_from_pending_or_in_progress() {
        let mut graph = abc();
        assert_eq!(complete(&mut graph, "c").unwrap(), DerivedStatus::Done);
        start(&mut graph, "a").unwrap();
        assert_eq!(complete(&mut graph, "a").unwrap(), DerivedStatus::Done);

        let err = complete(&mut graph, "a").unwrap_err();
        assert!(matches!(err, EngineError::State(StateError::AlreadyDone { .. })));
        assert!(start(&mut graph, "missing").is_err());
        assert!(complete(&mut graph, "missing").is_err());
    }
}
