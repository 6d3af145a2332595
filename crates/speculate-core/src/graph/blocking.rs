//! Blocking adjacency index built from a [`Graph`].
//!
//! # Overview
//!
//! Only `blocks` relationships gate execution order. This module extracts
//! them into id-keyed adjacency maps in both directions:
//!
//! - **incoming** (`blockers`): task id → ids that must finish first
//! - **outgoing** (`blocks`): task id → ids waiting on it
//!
//! `relates_to` and `part_of` edges are ignored entirely. Endpoints are kept
//! as-is even when they do not resolve to a task; callers decide how to
//! treat dangling ids.
//!
//! # Usage
//!
//! ```rust
//! use speculate_core::graph::blocking::BlockingIndex;
//! use speculate_core::model::{Graph, Relationship, Task};
//!
//! let mut graph = Graph::new();
//! graph.tasks.insert("a".into(), Task::new("a"));
//! graph.tasks.insert("b".into(), Task::new("b"));
//! graph.push_relationship(Relationship::blocks("a", "b"));
//!
//! let index = BlockingIndex::build(&graph);
//! assert_eq!(index.blockers("b"), ["a"]);
//! assert_eq!(index.blocks("a"), ["b"]);
//! ```

#![allow(
    clippy::must_use_candidate,
    clippy::module_name_repetitions,
)]

use std::collections::HashMap;

use crate::model::{Graph, RelationType};

/// Incoming and outgoing `blocks` adjacency keyed by task id.
///
/// Immutable once built. Rebuild with [`BlockingIndex::build`] after the
/// graph changes.
#[derive(Debug, Clone, Default)]
pub struct BlockingIndex {
    /// task id → ids of its blockers, in relationship order.
    incoming: HashMap<String, Vec<String>>,
    /// task id → ids it blocks, in relationship order.
    outgoing: HashMap<String, Vec<String>>,
}

impl BlockingIndex {
    /// Build the index from every `blocks` relationship in `graph`.
    ///
    /// # Complexity
    ///
    /// O(E) over all relationships.
    pub fn build(graph: &Graph) -> Self {
        let mut index = Self::default();
        for rel in &graph.relationships {
            if rel.kind == RelationType::Blocks {
                index.insert(&rel.from, &rel.to);
            }
        }
        index
    }

    /// Add a `from blocks to` edge. Duplicate edges are kept once.
    pub fn insert(&mut self, from: &str, to: &str) {
        let out = self.outgoing.entry(from.to_string()).or_default();
        if out.iter().any(|t| t == to) {
            return;
        }
        out.push(to.to_string());
        self.incoming
            .entry(to.to_string())
            .or_default()
            .push(from.to_string());
    }

    /// Ids that block `id`. Empty for unknown ids.
    pub fn blockers(&self, id: &str) -> &[String] {
        self.incoming.get(id).map_or(&[], Vec::as_slice)
    }

    /// Ids that `id` blocks. Empty for unknown ids.
    pub fn blocks(&self, id: &str) -> &[String] {
        self.outgoing.get(id).map_or(&[], Vec::as_slice)
    }

    /// Returns `true` if `from` already blocks `to` directly.
    pub fn contains_edge(&self, from: &str, to: &str) -> bool {
        self.blocks(from).iter().any(|t| t == to)
    }

    /// Number of distinct `blocks` edges.
    pub fn edge_count(&self) -> usize {
        self.outgoing.values().map(Vec::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Relationship, Task};

    fn graph(ids: &[&str], rels: &[Relationship]) -> Graph {
        let mut g = Graph::new();
        for id in ids {
            g.tasks.insert((*id).to_string(), Task::new(*id));
        }
        for rel in rels {
            g.push_relationship(rel.clone());
        }
        g
    }

    #[test]
    fn empty_graph_has_no_edges() {
        let index = BlockingIndex::build(&Graph::new());
        assert_eq!(index.edge_count(), 0);
        assert!(index.blockers("a").is_empty());
        assert!(index.blocks("a").is_empty());
    }

    #[test]
    fn indexes_both_directions() {
        let g = graph(
            &["a", "b", "c"],
            &[Relationship::blocks("a", "c"), Relationship::blocks("b", "c")],
        );
        let index = BlockingIndex::build(&g);

        assert_eq!(index.blockers("c"), ["a", "b"]);
        assert_eq!(index.blocks("a"), ["c"]);
        assert!(index.contains_edge("b", "c"));
        assert!(!index.contains_edge("c", "b"));
        assert_eq!(index.edge_count(), 2);
    }

    #[test]
    fn informational_edges_are_not_indexed() {
        let g = graph(
            &["a", "b"],
            &[
                Relationship::new("a", "b", RelationType::RelatesTo),
                Relationship::new("b", "a", RelationType::PartOf),
            ],
        );
        let index = BlockingIndex::build(&g);
        assert_eq!(index.edge_count(), 0);
        assert!(index.blockers("b").is_empty());
    }

    #[test]
    fn dangling_endpoints_are_kept() {
        let g = graph(&["b"], &[Relationship::blocks("ghost", "b")]);
        let index = BlockingIndex::build(&g);
        assert_eq!(index.blockers("b"), ["ghost"]);
    }

    #[test]
    fn insert_deduplicates() {
        let mut index = BlockingIndex::default();
        index.insert("a", "b");
        index.insert("a", "b");
        assert_eq!(index.edge_count(), 1);
        assert_eq!(index.blockers("b"), ["a"]);
    }
}
