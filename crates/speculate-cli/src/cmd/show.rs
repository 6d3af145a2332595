//! `spec show` — one task with its derived status and neighbours.

use std::io::Write;

use clap::Args;
use serde::Serialize;
use speculate_core::error::StateError;
use speculate_core::graph::{BlockingIndex, derive_with_index};
use speculate_core::model::{DerivedStatus, Graph, RelationType, Relationship, Task};

use super::Project;
use crate::output::{OutputMode, fail, pretty_kv, pretty_section, render_mode};

#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Task ID to show.
    pub id: String,
}

/// A neighbouring task. `status` is `None` when the id does not resolve.
#[derive(Debug, Serialize)]
struct LinkedTask {
    id: String,
    status: Option<DerivedStatus>,
}

#[derive(Debug, Serialize)]
struct ShowOutput {
    #[serde(flatten)]
    task: Task,
    derived_status: DerivedStatus,
    blocked_by: Vec<LinkedTask>,
    blocks: Vec<LinkedTask>,
    /// Non-blocking relationships touching this task.
    related: Vec<Relationship>,
}

fn linked<'a>(
    ids: impl Iterator<Item = &'a str>,
    graph: &Graph,
    index: &BlockingIndex,
) -> Vec<LinkedTask> {
    ids.map(|id| LinkedTask {
        id: id.to_string(),
        status: graph.task(id).map(|t| derive_with_index(t, graph, index)),
    })
    .collect()
}

fn build(graph: &Graph, id: &str) -> Result<ShowOutput, StateError> {
    let task = graph
        .task(id)
        .ok_or_else(|| StateError::NotFound { id: id.to_string() })?;
    let index = BlockingIndex::build(graph);

    Ok(ShowOutput {
        task: task.clone(),
        derived_status: derive_with_index(task, graph, &index),
        blocked_by: linked(graph.blockers_of(id), graph, &index),
        blocks: linked(graph.blocked_by(id), graph, &index),
        related: graph
            .relationships_of(id)
            .filter(|r| r.kind != RelationType::Blocks)
            .cloned()
            .collect(),
    })
}

fn status_label(status: Option<DerivedStatus>) -> &'static str {
    status.map_or("missing", DerivedStatus::as_str)
}

pub fn run_show(args: &ShowArgs, output: OutputMode, project: &Project) -> anyhow::Result<()> {
    let graph = project.load(output)?;
    let result = build(&graph, &args.id).map_err(|e| fail(output, e.into()))?;
    render_mode(output, &result, render_text, render_pretty)
}

fn render_text(r: &ShowOutput, w: &mut dyn Write) -> std::io::Result<()> {
    writeln!(w, "{}  {}", r.task.id, r.derived_status)?;
    if !r.task.description.is_empty() {
        writeln!(w, "description  {}", r.task.description)?;
    }
    if let Some(hours) = r.task.estimate_hours {
        writeln!(w, "estimate  {hours}h")?;
    }
    for link in &r.blocked_by {
        writeln!(w, "blocked_by  {}  {}", link.id, status_label(link.status))?;
    }
    for link in &r.blocks {
        writeln!(w, "blocks  {}  {}", link.id, status_label(link.status))?;
    }
    for rel in &r.related {
        writeln!(w, "related  {rel}")?;
    }
    Ok(())
}

fn render_pretty(r: &ShowOutput, w: &mut dyn Write) -> std::io::Result<()> {
    let task = &r.task;
    pretty_section(w, &format!("Task: {}", task.id))?;
    pretty_kv(
        w,
        "Status",
        format!("{} {}", r.derived_status.icon(), r.derived_status),
    )?;
    if let Some(hours) = task.estimate_hours {
        pretty_kv(w, "Estimate", format!("{hours}h"))?;
    }
    if !task.description.is_empty() {
        writeln!(w, "\nDescription:\n  {}", task.description)?;
    }

    if !task.acceptance_criteria.is_empty() {
        writeln!(w, "\nAcceptance Criteria:")?;
        for (i, criterion) in task.acceptance_criteria.iter().enumerate() {
            writeln!(w, "  {}. {criterion}", i + 1)?;
        }
    }

    if !task.checklist.is_empty() {
        let (done, total) = task.checklist_progress();
        writeln!(w, "\nChecklist (Progress: {done}/{total}):")?;
        for item in &task.checklist {
            let mark = if item.done { "✓" } else { "○" };
            writeln!(w, "  {mark} {}", item.item)?;
        }
    }

    if !r.blocked_by.is_empty() {
        writeln!(w, "\nBlocked by:")?;
        for link in &r.blocked_by {
            let icon = link.status.map_or("?", DerivedStatus::icon);
            writeln!(w, "  {icon} {} ({})", link.id, status_label(link.status))?;
        }
    }

    if !r.blocks.is_empty() {
        writeln!(w, "\nBlocks:")?;
        for link in &r.blocks {
            writeln!(w, "  - {} ({})", link.id, status_label(link.status))?;
        }
    }

    if !r.related.is_empty() {
        writeln!(w, "\nRelated:")?;
        for rel in &r.related {
            writeln!(w, "  - {rel}")?;
        }
    }
    Ok(())
}
