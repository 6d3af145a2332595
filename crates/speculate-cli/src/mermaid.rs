//! Mermaid flowchart rendering for projected diagrams.

use std::fmt::Write as _;

use speculate_core::diagram::{ColorClass, Diagram, DiagramNode, Highlight};
use speculate_core::model::RelationType;

const CLASS_DEFS: [(&str, &str); 6] = [
    ("done", "fill:#90EE90,stroke:#333,stroke-width:2px"),
    ("inProgress", "fill:#ADD8E6,stroke:#333,stroke-width:2px"),
    ("ready", "fill:#98FB98,stroke:#2E7D32,stroke-width:3px"),
    ("blocked", "fill:#D3D3D3,stroke:#666,stroke-width:1px"),
    ("willUnblock", "fill:#00FA9A,stroke:#006400,stroke-width:4px"),
    ("stillBlocked", "fill:#FFE4B5,stroke:#DAA520,stroke-width:2px"),
];

/// Mermaid node ids allow only word characters.
pub fn sanitize_id(id: &str) -> String {
    id.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect()
}

fn label(node: &DiagramNode) -> String {
    let mut label = node.id.replace('"', "#quot;");
    if let Some(hours) = node.estimate_hours {
        let _ = write!(label, " ({hours}h)");
    }
    let _ = write!(label, " [{}]", node.status.icon());
    label
}

fn arrow(kind: RelationType) -> &'static str {
    match kind {
        RelationType::Blocks => "-->",
        RelationType::PartOf => "-.->",
        RelationType::RelatesTo => "~~~",
    }
}

/// Style class for a node. Overlay highlights replace the status color.
fn class_of(node: &DiagramNode) -> &'static str {
    match (node.highlight, node.color) {
        (Some(Highlight::WillUnblock), _) => "willUnblock",
        (Some(Highlight::StillBlocked), _) => "stillBlocked",
        (None, ColorClass::Done) => "done",
        (None, ColorClass::InProgress) => "inProgress",
        (None, ColorClass::Ready) => "ready",
        (None, ColorClass::Blocked) => "blocked",
    }
}

/// Render `diagram` as a `graph TD` flowchart, without a markdown fence.
pub fn render(diagram: &Diagram) -> String {
    let mut out = String::from("graph TD\n");
    if diagram.is_empty() {
        out.push_str("  empty[\"No tasks to display\"]\n");
        return out;
    }

    for node in &diagram.nodes {
        let _ = writeln!(out, "  {}[\"{}\"]", sanitize_id(&node.id), label(node));
    }
    for edge in &diagram.edges {
        let _ = writeln!(
            out,
            "  {} {} {}",
            sanitize_id(&edge.from),
            arrow(edge.kind),
            sanitize_id(&edge.to)
        );
    }

    out.push('\n');
    for (class, style) in CLASS_DEFS {
        let members: Vec<String> = diagram
            .nodes
            .iter()
            .filter(|n| class_of(n) == class)
            .map(|n| sanitize_id(&n.id))
            .collect();
        if members.is_empty() {
            continue;
        }
        let _ = writeln!(out, "  classDef {class} {style}");
        let _ = writeln!(out, "  class {} {class}", members.join(","));
    }
    out
}

/// Render wrapped in a ```` ```mermaid ```` fence for markdown viewers.
pub fn render_fenced(diagram: &Diagram) -> String {
    format!("```mermaid\n{}```\n", render(diagram))
}
