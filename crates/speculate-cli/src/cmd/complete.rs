//! `spec complete` — mark a task done and report what it unblocked.

use std::io::Write;

use clap::Args;
use serde::Serialize;
use speculate_core::graph::impact_of;
use speculate_core::model::DerivedStatus;
use speculate_core::mutation;

use super::Project;
use crate::output::{OutputMode, render_mode};

#[derive(Args, Debug)]
pub struct CompleteArgs {
    /// Task ID to complete.
    pub id: String,
}

#[derive(Debug, Serialize)]
struct CompleteOutput {
    id: String,
    status: DerivedStatus,
    /// Tasks that became ready because of this completion.
    unblocked: Vec<String>,
}

pub fn run_complete(
    args: &CompleteArgs,
    output: OutputMode,
    project: &Project,
) -> anyhow::Result<()> {
    let (status, unblocked) = project.transact(output, |graph| {
        // Impact on the pre-completion graph is exactly what completion frees up.
        let impact = impact_of(&args.id, graph)?;
        let status = mutation::complete(graph, &args.id)?;
        Ok((status, impact.unblocked))
    })?;

    let result = CompleteOutput {
        id: args.id.clone(),
        status,
        unblocked,
    };
    render_mode(
        output,
        &result,
        |r, w: &mut dyn Write| {
            writeln!(w, "{}  {}", r.id, r.status)?;
            for id in &r.unblocked {
                writeln!(w, "unblocked  {id}")?;
            }
            Ok(())
        },
        |r, w: &mut dyn Write| {
            writeln!(w, "{} Completed task: {}", r.status.icon(), r.id)?;
            if !r.unblocked.is_empty() {
                writeln!(w, "  Now ready: {}", r.unblocked.join(", "))?;
            }
            Ok(())
        },
    )
}
