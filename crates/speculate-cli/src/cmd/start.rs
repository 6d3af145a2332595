//! `spec start` — move a ready task to in-progress.

use std::io::Write;

use clap::Args;
use serde::Serialize;
use speculate_core::model::DerivedStatus;
use speculate_core::mutation;

use super::Project;
use crate::output::{OutputMode, render_mode};

#[derive(Args, Debug)]
pub struct StartArgs {
    /// Task ID to start.
    pub id: String,
}

#[derive(Debug, Serialize)]
struct StartOutput {
    id: String,
    status: DerivedStatus,
}

pub fn run_start(args: &StartArgs, output: OutputMode, project: &Project) -> anyhow::Result<()> {
    let status = project.transact(output, |graph| mutation::start(graph, &args.id))?;

    let result = StartOutput {
        id: args.id.clone(),
        status,
    };
    render_mode(
        output,
        &result,
        |r, w: &mut dyn Write| writeln!(w, "{}  {}", r.id, r.status),
        |r, w: &mut dyn Write| writeln!(w, "{} Started task: {}", r.status.icon(), r.id),
    )
}
