//! Cycle detection for the blocking dependency graph.
//!
//! # Overview
//!
//! `blocks` edges must form a DAG: a cycle leaves every task on it
//! permanently blocked. Two entry points:
//!
//! - [`would_create_cycle`] — incremental check used by the mutation engine
//!   before committing a new `blocks` edge. Returns the concrete path the new
//!   edge would close.
//! - [`find_all_cycles`] — full audit used by `validate`. Finds every
//!   strongly connected component of the `blocks` subgraph with
//!   [`petgraph::algo::tarjan_scc`] and reports one ordered cycle per back
//!   edge of a depth-first walk inside each component.
//!
//! # Edge Direction
//!
//! An edge `A → B` means "A blocks B". Adding `from → to` closes a cycle iff
//! `from` is already reachable from `to`.
//!
//! `relates_to` and `part_of` edges never participate.

#![allow(
    clippy::must_use_candidate,
    clippy::module_name_repetitions,
)]

use std::collections::{HashMap, HashSet, VecDeque};

use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};

use super::blocking::BlockingIndex;
use crate::model::{Graph, RelationType};

// ---------------------------------------------------------------------------
// Incremental detection
// ---------------------------------------------------------------------------

/// Check whether adding `from blocks to` would introduce a cycle.
///
/// Returns the cycle path `from → to → … → from` when it would. A self-loop
/// yields `[from, from]`. If the edge already exists no *new* cycle is
/// created and this returns `None`.
///
/// # Complexity
///
/// O(V+E): breadth-first search from `to` over outgoing `blocks` edges.
pub fn would_create_cycle(index: &BlockingIndex, from: &str, to: &str) -> Option<Vec<String>> {
    if from == to {
        return Some(vec![from.to_string(), from.to_string()]);
    }

    if index.contains_edge(from, to) {
        return None;
    }

    let mut queue: VecDeque<&str> = VecDeque::from([to]);
    let mut visited: HashSet<&str> = HashSet::from([to]);
    let mut parent: HashMap<&str, &str> = HashMap::new();

    while let Some(current) = queue.pop_front() {
        if current == from {
            return Some(reconstruct(&parent, from, to));
        }

        for next in index.blocks(current) {
            let next = next.as_str();
            if visited.insert(next) {
                parent.insert(next, current);
                queue.push_back(next);
            }
        }
    }

    None
}

/// Build `from → to → … → from` from the BFS parent links rooted at `to`.
fn reconstruct(parent: &HashMap<&str, &str>, from: &str, to: &str) -> Vec<String> {
    let mut chain = vec![from.to_string()];
    let mut current = from;
    while current != to {
        match parent.get(current) {
            Some(prev) => {
                chain.push((*prev).to_string());
                current = prev;
            }
            None => break,
        }
    }
    chain.reverse();

    let mut path = Vec::with_capacity(chain.len() + 1);
    path.push(from.to_string());
    path.extend(chain);
    path
}

// ---------------------------------------------------------------------------
// Full-graph detection
// ---------------------------------------------------------------------------

/// Directed graph of `blocks` edges only, with every endpoint as a node.
///
/// Dangling endpoints become nodes too, so a loop through a missing task is
/// still reported.
fn blocking_digraph(graph: &Graph) -> DiGraph<String, ()> {
    let mut digraph: DiGraph<String, ()> = DiGraph::new();
    let mut nodes: HashMap<&str, NodeIndex> = HashMap::new();

    let blocking: Vec<_> = graph
        .relationships
        .iter()
        .filter(|r| r.kind == RelationType::Blocks)
        .collect();

    let ids = graph
        .tasks
        .keys()
        .map(String::as_str)
        .chain(blocking.iter().flat_map(|r| [r.from.as_str(), r.to.as_str()]));
    for id in ids {
        nodes
            .entry(id)
            .or_insert_with(|| digraph.add_node(id.to_string()));
    }

    for rel in blocking {
        if let (Some(&a), Some(&b)) = (nodes.get(rel.from.as_str()), nodes.get(rel.to.as_str())) {
            if !digraph.contains_edge(a, b) {
                digraph.add_edge(a, b, ());
            }
        }
    }
    digraph
}

/// Find every cycle in the `blocks` subgraph.
///
/// Each strongly connected component with a cycle is walked depth-first from
/// its lexicographically smallest id, and every back edge found yields one
/// entry: the ordered path that starts and ends at the node the back edge
/// returns to, e.g. `["a", "b", "c", "a"]`. Two loops sharing a node are
/// reported separately. Self-loops are reported as `["a", "a"]`. Output is
/// sorted and deterministic.
///
/// # Complexity
///
/// O(V+E) for Tarjan plus one DFS per component for path extraction.
pub fn find_all_cycles(graph: &Graph) -> Vec<Vec<String>> {
    let digraph = blocking_digraph(graph);

    let mut cycles: Vec<Vec<String>> = tarjan_scc(&digraph)
        .into_iter()
        .filter(|component| {
            component.len() > 1
                || component
                    .first()
                    .is_some_and(|&n| digraph.contains_edge(n, n))
        })
        .flat_map(|component| cycles_in_component(&digraph, &component))
        .collect();

    cycles.sort_unstable();
    cycles
}

/// One cycle per back edge of a DFS confined to `component`.
fn cycles_in_component(digraph: &DiGraph<String, ()>, component: &[NodeIndex]) -> Vec<Vec<String>> {
    let members: HashSet<NodeIndex> = component.iter().copied().collect();
    let Some(&start) = component.iter().min_by(|a, b| digraph[**a].cmp(&digraph[**b])) else {
        return Vec::new();
    };

    // Neighbor order from petgraph is reverse insertion; sort for stable output.
    let sorted_neighbors = |node: NodeIndex| -> std::vec::IntoIter<NodeIndex> {
        let mut next: Vec<NodeIndex> = digraph
            .neighbors(node)
            .filter(|n| members.contains(n))
            .collect();
        next.sort_by(|a, b| digraph[*a].cmp(&digraph[*b]));
        next.into_iter()
    };

    let mut cycles = Vec::new();
    let mut visited: HashSet<NodeIndex> = HashSet::from([start]);
    let mut path: Vec<NodeIndex> = vec![start];
    let mut frames = vec![sorted_neighbors(start)];

    while let Some(frame) = frames.last_mut() {
        let Some(next) = frame.next() else {
            frames.pop();
            path.pop();
            continue;
        };

        if let Some(pos) = path.iter().position(|&n| n == next) {
            let mut cycle: Vec<String> = path[pos..].iter().map(|&n| digraph[n].clone()).collect();
            cycle.push(digraph[next].clone());
            cycles.push(cycle);
        } else if visited.insert(next) {
            path.push(next);
            frames.push(sorted_neighbors(next));
        }
    }

    cycles
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
