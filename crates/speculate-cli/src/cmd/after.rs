//! `spec after` — what completing a task would unblock.

use std::io::Write;

use clap::Args;
use speculate_core::diagram::{self, ProjectionFilter};
use speculate_core::graph::{Impact, impact_of};

use super::Project;
use crate::mermaid;
use crate::output::{OutputMode, fail, pretty_section, render_mode};

#[derive(Args, Debug)]
pub struct AfterArgs {
    /// Task ID to analyze.
    pub id: String,

    /// Skip the highlighted diagram in pretty/text output.
    #[arg(long)]
    pub no_diagram: bool,
}

pub fn run_after(args: &AfterArgs, output: OutputMode, project: &Project) -> anyhow::Result<()> {
    let graph = project.load(output)?;
    let impact = impact_of(&args.id, &graph).map_err(|e| fail(output, e.into()))?;

    let rendered = if args.no_diagram || output.is_json() {
        None
    } else {
        let mut diagram = diagram::project(&graph, ProjectionFilter::NotDone);
        diagram.overlay(&impact);
        Some(diagram)
    };

    render_mode(
        output,
        &impact,
        |i, w: &mut dyn Write| {
            write_text(i, w)?;
            if let Some(d) = &rendered {
                write!(w, "{}", mermaid::render(d))?;
            }
            Ok(())
        },
        |i, w: &mut dyn Write| {
            write_pretty(i, w)?;
            if let Some(d) = &rendered {
                writeln!(w)?;
                write!(w, "{}", mermaid::render_fenced(d))?;
            }
            Ok(())
        },
    )
}

fn write_text(impact: &Impact, w: &mut dyn Write) -> std::io::Result<()> {
    for id in &impact.unblocked {
        writeln!(w, "unblocked  {id}")?;
    }
    for id in &impact.still_blocked {
        writeln!(w, "still_blocked  {id}")?;
    }
    Ok(())
}

fn write_pretty(impact: &Impact, w: &mut dyn Write) -> std::io::Result<()> {
    pretty_section(w, &format!("After completing {}", impact.task))?;
    if impact.is_empty() {
        return writeln!(w, "Nothing downstream is waiting on this task.");
    }
    if !impact.unblocked.is_empty() {
        writeln!(w, "Will unblock:")?;
        for id in &impact.unblocked {
            writeln!(w, "  ✓ {id}")?;
        }
    }
    if !impact.still_blocked.is_empty() {
        writeln!(w, "Still blocked:")?;
        for id in &impact.still_blocked {
            writeln!(w, "  ○ {id}")?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use speculate_core::model::{Graph, Relationship, Task};
    use tempfile::TempDir;

    fn chain(project: &Project) {
        let mut g = Graph::new();
        for id in ["a", "b", "c"] {
            g.tasks.insert(id.into(), Task::new(id));
        }
        g.push_relationship(Relationship::blocks("a", "b"));
        g.push_relationship(Relationship::blocks("b", "c"));
        project.store().save(&g).unwrap();
    }

    #[test]
    fn run_after_known_task() {
        let dir = TempDir::new().unwrap();
        let project = Project::at(dir.path());
        chain(&project);
        for mode in [OutputMode::Pretty, OutputMode::Text, OutputMode::Json] {
            let args = AfterArgs {
                id: "a".into(),
                no_diagram: false,
            };
            run_after(&args, mode, &project).unwrap();
        }
    }

    #[test]
    fn run_after_unknown_task_fails() {
        let dir = TempDir::new().unwrap();
        let project = Project::at(dir.path());
        chain(&project);
        let args = AfterArgs {
            id: "zzz".into(),
            no_diagram: true,
        };
        assert!(run_after(&args, OutputMode::Text, &project).is_err());
    }

    #[test]
    fn text_lists_both_groups() {
        let impact = Impact {
            task: "a".into(),
            unblocked: vec!["b".into()],
            still_blocked: vec!["c".into()],
        };
        let mut buf = Vec::new();
        write_text(&impact, &mut buf).unwrap();
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "unblocked  b\nstill_blocked  c\n"
        );
    }
}
