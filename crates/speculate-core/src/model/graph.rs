//! The in-memory task graph.
//!
//! [`Graph`] is plain data: a map of tasks keyed by id plus an ordered list
//! of relationships. It enforces nothing by itself. Invariants (unique ids,
//! resolvable endpoints, acyclic `blocks` subgraph) are established by the
//! mutation engine before a graph is committed, and audited by
//! [`crate::graph::validate`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::relationship::{RelationType, Relationship};
use super::task::Task;

/// All tasks and relationships of one project.
///
/// Tasks are kept in a `BTreeMap` so the serialized document is
/// byte-for-byte deterministic for a given logical state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Graph {
    #[serde(default, alias = "nodes")]
    pub tasks: BTreeMap<String, Task>,
    #[serde(default, alias = "edges")]
    pub relationships: Vec<Relationship>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn task(&self, id: &str) -> Option<&Task> {
        self.tasks.get(id)
    }

    pub fn task_mut(&mut self, id: &str) -> Option<&mut Task> {
        self.tasks.get_mut(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.tasks.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Returns `true` if an identical (from, to, type) relationship exists.
    pub fn has_relationship(&self, rel: &Relationship) -> bool {
        self.relationships.iter().any(|r| r == rel)
    }

    /// Append `rel` unless an identical one exists. Returns `true` if added.
    ///
    /// Endpoint existence is not checked here.
    pub fn push_relationship(&mut self, rel: Relationship) -> bool {
        if self.has_relationship(&rel) {
            return false;
        }
        self.relationships.push(rel);
        true
    }

    /// Relationships of any type that have `id` as either endpoint.
    pub fn relationships_of<'a>(&'a self, id: &'a str) -> impl Iterator<Item = &'a Relationship> + 'a {
        self.relationships.iter().filter(move |r| r.touches(id))
    }

    /// Ids of tasks with a `blocks` edge into `id`, in relationship order.
    pub fn blockers_of<'a>(&'a self, id: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.relationships
            .iter()
            .filter(move |r| r.kind == RelationType::Blocks && r.to == id)
            .map(|r| r.from.as_str())
    }

    /// Ids of tasks that `id` blocks, in relationship order.
    pub fn blocked_by<'a>(&'a self, id: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.relationships
            .iter()
            .filter(move |r| r.kind == RelationType::Blocks && r.from == id)
            .map(|r| r.to.as_str())
    }
}
