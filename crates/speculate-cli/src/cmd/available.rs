//! `spec available` — diagram of all work not yet done.

use std::io::Write;

use clap::Args;
use serde::Serialize;
use speculate_core::diagram::{self, ColorClass, Diagram, ProjectionFilter};

use super::Project;
use crate::mermaid;
use crate::output::{OutputMode, render_mode};

#[derive(Args, Debug)]
pub struct AvailableArgs {
    /// Include done tasks as well.
    #[arg(long)]
    pub all: bool,
}

#[derive(Debug, Serialize)]
struct AvailableOutput {
    /// Tasks that can be started right now.
    ready: Vec<String>,
    diagram: Diagram,
}

pub fn run_available(
    args: &AvailableArgs,
    output: OutputMode,
    project: &Project,
) -> anyhow::Result<()> {
    let graph = project.load(output)?;
    let filter = if args.all {
        ProjectionFilter::All
    } else {
        ProjectionFilter::NotDone
    };
    let diagram = diagram::project(&graph, filter);
    let ready = diagram
        .nodes
        .iter()
        .filter(|n| n.color == ColorClass::Ready)
        .map(|n| n.id.clone())
        .collect();

    let result = AvailableOutput { ready, diagram };
    render_mode(
        output,
        &result,
        |r, w: &mut dyn Write| write!(w, "{}", mermaid::render(&r.diagram)),
        |r, w: &mut dyn Write| {
            if r.diagram.is_empty() {
                return writeln!(w, "No tasks to display");
            }
            write!(w, "{}", mermaid::render_fenced(&r.diagram))?;
            if r.ready.is_empty() {
                writeln!(w, "\nNo task is ready to start.")
            } else {
                writeln!(w, "\nReady: {}", r.ready.join(", "))
            }
        },
    )
}
