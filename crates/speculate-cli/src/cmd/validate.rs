//! `spec validate` — audit graph health.

use std::io::Write;

use clap::Args;
use serde::Serialize;
use speculate_core::graph::{ValidationReport, validate_with};

use super::Project;
use crate::output::{CliError, OutputMode, pretty_kv, pretty_section, render_error, render_mode};

#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Exit non-zero when the graph has any problems.
    #[arg(long)]
    pub strict: bool,
}

#[derive(Debug, Serialize)]
struct ValidateOutput {
    healthy: bool,
    tasks: usize,
    relationships: usize,
    problems: usize,
    #[serde(flatten)]
    report: ValidationReport,
}

pub fn run_validate(
    args: &ValidateArgs,
    output: OutputMode,
    project: &Project,
) -> anyhow::Result<()> {
    let graph = project.load(output)?;
    let report = validate_with(&graph, &project.config.validate);

    let result = ValidateOutput {
        healthy: report.is_healthy(),
        tasks: graph.len(),
        relationships: graph.relationships.len(),
        problems: report.problem_count(),
        report,
    };
    render_mode(output, &result, render_text, render_pretty)?;

    if args.strict && !result.healthy {
        render_error(
            output,
            &CliError::with_details(
                format!("graph is unhealthy: {} problem(s)", result.problems),
                "fix the reported findings and re-run `spec validate`",
                "graph_unhealthy",
            ),
        )?;
        anyhow::bail!("graph is unhealthy: {} problem(s)", result.problems);
    }
    Ok(())
}

fn render_text(r: &ValidateOutput, w: &mut dyn Write) -> std::io::Result<()> {
    for err in r.report.errors() {
        writeln!(w, "{}  {err}", err.code())?;
    }
    for id in &r.report.isolated {
        writeln!(w, "isolated  {id}")?;
    }
    let verdict = if r.healthy { "healthy" } else { "unhealthy" };
    writeln!(
        w,
        "{verdict}  tasks={}  relationships={}  problems={}",
        r.tasks, r.relationships, r.problems
    )
}

fn render_pretty(r: &ValidateOutput, w: &mut dyn Write) -> std::io::Result<()> {
    let report = &r.report;
    if r.healthy {
        pretty_section(w, "Validation PASSED: Graph is healthy")?;
    } else {
        pretty_section(w, "Validation FAILED:")?;
    }

    if !report.cycles.is_empty() {
        writeln!(w, "\nCycles detected:")?;
        for cycle in &report.cycles {
            writeln!(w, "  - {}", cycle.join(" → "))?;
        }
    }
    if !report.dangling.is_empty() {
        writeln!(w, "\nBroken relationships:")?;
        for d in &report.dangling {
            writeln!(w, "  - {} → {} ({}): {}", d.from, d.to, d.kind, d.missing)?;
        }
    }
    if !report.self_loops.is_empty() {
        writeln!(w, "\nSelf-referencing relationships:")?;
        for rel in &report.self_loops {
            writeln!(w, "  - {rel}")?;
        }
    }
    if !report.naming.is_empty() {
        writeln!(w, "\nInvalid task IDs:")?;
        for n in &report.naming {
            writeln!(w, "  - {}: {}", n.id, n.reason)?;
        }
    }
    if !report.estimates.is_empty() {
        writeln!(w, "\nInvalid estimates:")?;
        for e in &report.estimates {
            writeln!(w, "  - {}: {}h", e.id, e.value)?;
        }
    }
    if !report.isolated.is_empty() {
        writeln!(w, "\nIsolated tasks (no relationships):")?;
        for id in &report.isolated {
            writeln!(w, "  - {id}")?;
        }
    }

    writeln!(w)?;
    pretty_kv(w, "Tasks", r.tasks.to_string())?;
    pretty_kv(w, "Relations", r.relationships.to_string())?;
    if !r.healthy {
        pretty_kv(w, "Problems", r.problems.to_string())?;
    }
    Ok(())
}
