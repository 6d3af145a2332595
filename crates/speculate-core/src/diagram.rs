//! Diagram projection: the graph as a flat, render-ready node and edge list.
//!
//! The projector decides *what* to draw and how to classify it. Turning a
//! [`Diagram`] into Mermaid (or anything else) is the renderer's job.

#![allow(clippy::must_use_candidate, clippy::module_name_repetitions)]

use std::collections::HashSet;

use serde::Serialize;

use crate::graph::blocking::BlockingIndex;
use crate::graph::impact::Impact;
use crate::graph::status::derive_with_index;
use crate::model::{DerivedStatus, Graph, RelationType};

/// Visual class of a node. One per derived status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ColorClass {
    Ready,
    Blocked,
    InProgress,
    Done,
}

impl From<DerivedStatus> for ColorClass {
    fn from(status: DerivedStatus) -> Self {
        match status {
            DerivedStatus::Ready => Self::Ready,
            DerivedStatus::Blocked => Self::Blocked,
            DerivedStatus::InProgress => Self::InProgress,
            DerivedStatus::Done => Self::Done,
        }
    }
}

/// Extra emphasis from an impact overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Highlight {
    WillUnblock,
    StillBlocked,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiagramNode {
    pub id: String,
    pub status: DerivedStatus,
    pub color: ColorClass,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimate_hours: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub highlight: Option<Highlight>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiagramEdge {
    pub from: String,
    pub to: String,
    pub kind: RelationType,
}

/// Which tasks to include.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProjectionFilter {
    /// Everything not yet done.
    #[default]
    NotDone,
    All,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Diagram {
    pub nodes: Vec<DiagramNode>,
    pub edges: Vec<DiagramEdge>,
}

impl Diagram {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: &str) -> Option<&DiagramNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Mark nodes named in `impact`. Ids not in the diagram are ignored.
    pub fn overlay(&mut self, impact: &Impact) {
        let unblocked: HashSet<&str> = impact.unblocked.iter().map(String::as_str).collect();
        let still: HashSet<&str> = impact.still_blocked.iter().map(String::as_str).collect();
        for node in &mut self.nodes {
            if unblocked.contains(node.id.as_str()) {
                node.highlight = Some(Highlight::WillUnblock);
            } else if still.contains(node.id.as_str()) {
                node.highlight = Some(Highlight::StillBlocked);
            }
        }
    }
}

/// Project `graph` into a diagram. Nodes come out in id order, edges in
/// relationship order, and only edges between visible nodes are kept.
pub fn project(graph: &Graph, filter: ProjectionFilter) -> Diagram {
    let index = BlockingIndex::build(graph);

    let nodes: Vec<DiagramNode> = graph
        .tasks
        .values()
        .filter(|task| filter == ProjectionFilter::All || !task.is_complete())
        .map(|task| {
            let status = derive_with_index(task, graph, &index);
            DiagramNode {
                id: task.id.clone(),
                status,
                color: status.into(),
                estimate_hours: task.estimate_hours,
                highlight: None,
            }
        })
        .collect();

    let visible: HashSet<&str> = nodes.iter().map(|n| n.id.as_str()).collect();
    let edges = graph
        .relationships
        .iter()
        .filter(|r| visible.contains(r.from.as_str()) && visible.contains(r.to.as_str()))
        .map(|r| DiagramEdge {
            from: r.from.clone(),
            to: r.to.clone(),
            kind: r.kind,
        })
        .collect();

    Diagram { nodes, edges }
}
