//! `spec add` — add a batch of tasks and relationships.

use std::io::Write;

use clap::Args;
use speculate_core::mutation::{self, AddRequest, AddSummary, request};

use super::{Project, read_payload};
use crate::output::{OutputMode, fail, render_mode};

#[derive(Args, Debug)]
pub struct AddArgs {
    /// JSON batch: `{"tasks":[...], "relationships":[...]}`.
    ///
    /// Pass `-` to read from stdin or `@file.json` to read a file.
    pub payload: String,
}

pub fn run_add(args: &AddArgs, output: OutputMode, project: &Project) -> anyhow::Result<()> {
    let raw = read_payload(&args.payload, &project.root, output)?;
    let req: AddRequest = request::from_json(&raw).map_err(|e| fail(output, e.into()))?;

    let summary = project.transact(output, |graph| mutation::add(graph, req))?;

    render_mode(output, &summary, render_text, render_pretty)
}

fn render_text(summary: &AddSummary, w: &mut dyn Write) -> std::io::Result<()> {
    for id in &summary.tasks_added {
        writeln!(w, "added  {id}")?;
    }
    writeln!(
        w,
        "relationships  added={}  skipped={}",
        summary.relationships_added, summary.relationships_skipped
    )
}

fn render_pretty(summary: &AddSummary, w: &mut dyn Write) -> std::io::Result<()> {
    write!(
        w,
        "✓ Added {} task(s) and {} relationship(s)",
        summary.tasks_added.len(),
        summary.relationships_added
    )?;
    if summary.relationships_skipped > 0 {
        write!(w, " ({} already present)", summary.relationships_skipped)?;
    }
    writeln!(w)?;
    for id in &summary.tasks_added {
        writeln!(w, "  + {id}")?;
    }
    Ok(())
}
