//! `spec delete` — remove tasks and relationships.

use std::io::Write;

use clap::Args;
use speculate_core::mutation::{self, DeleteRequest, DeleteSummary, request};

use super::{Project, read_payload};
use crate::output::{OutputMode, fail, render_mode};

#[derive(Args, Debug)]
pub struct DeleteArgs {
    /// JSON batch: `{"tasks":[ids], "relationships":[{"from","to","type"?}]}`.
    ///
    /// A task can only be deleted together with every task it is related to,
    /// or after those relationships are removed in the same batch.
    pub payload: String,
}

pub fn run_delete(args: &DeleteArgs, output: OutputMode, project: &Project) -> anyhow::Result<()> {
    let raw = read_payload(&args.payload, &project.root, output)?;
    let req: DeleteRequest = request::from_json(&raw).map_err(|e| fail(output, e.into()))?;

    let summary = project.transact(output, |graph| mutation::delete(graph, req))?;

    render_mode(
        output,
        &summary,
        |s: &DeleteSummary, w: &mut dyn Write| {
            for id in &s.tasks_deleted {
                writeln!(w, "deleted  {id}")?;
            }
            writeln!(w, "relationships  removed={}", s.relationships_removed)
        },
        |s: &DeleteSummary, w: &mut dyn Write| {
            writeln!(
                w,
                "✓ Deleted {} task(s) and {} relationship(s)",
                s.tasks_deleted.len(),
                s.relationships_removed
            )?;
            for id in &s.tasks_deleted {
                writeln!(w, "  - {id}")?;
            }
            Ok(())
        },
    )
}
