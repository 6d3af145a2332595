//! `spec update` — patch fields of existing tasks.

use std::io::Write;

use clap::Args;
use speculate_core::mutation::{self, UpdateRequest, UpdateSummary, request};

use super::{Project, read_payload};
use crate::output::{OutputMode, fail, render_mode};

#[derive(Args, Debug)]
pub struct UpdateArgs {
    /// JSON batch: `{"tasks":[{"id": "...", <fields to change>}]}`.
    ///
    /// Pass `-` to read from stdin or `@file.json` to read a file.
    pub payload: String,
}

pub fn run_update(args: &UpdateArgs, output: OutputMode, project: &Project) -> anyhow::Result<()> {
    let raw = read_payload(&args.payload, &project.root, output)?;
    let req: UpdateRequest = request::from_json(&raw).map_err(|e| fail(output, e.into()))?;

    let summary = project.transact(output, |graph| mutation::update(graph, req))?;

    render_mode(
        output,
        &summary,
        |s: &UpdateSummary, w: &mut dyn Write| {
            for id in &s.tasks_updated {
                writeln!(w, "updated  {id}")?;
            }
            Ok(())
        },
        |s: &UpdateSummary, w: &mut dyn Write| {
            writeln!(w, "✓ Updated {} task(s)", s.tasks_updated.len())?;
            for id in &s.tasks_updated {
                writeln!(w, "  ~ {id}")?;
            }
            Ok(())
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use speculate_core::model::TaskStatus;
    use tempfile::TempDir;

    fn seeded() -> (TempDir, Project) {
        let dir = TempDir::new().unwrap();
        let project = Project::at(dir.path());
        let req = request::from_json(r#"{"tasks":[{"id":"write-docs"}]}"#).unwrap();
        project
            .store()
            .transact(|graph| mutation::add(graph, req))
            .unwrap();
        (dir, project)
    }

    #[test]
    fn run_update_changes_fields() {
        let (_dir, project) = seeded();
        let args = UpdateArgs {
            payload: r#"{"tasks":[{"id":"write-docs","description":"README","estimate_hours":2,"status":"in_progress"}]}"#
                .into(),
        };
        run_update(&args, OutputMode::Text, &project).unwrap();

        let graph = project.store().load().unwrap();
        let task = graph.task("write-docs").unwrap();
        assert_eq!(task.description, "README");
        assert_eq!(task.estimate_hours, Some(2.0));
        assert_eq!(task.status, TaskStatus::InProgress);
    }

    #[test]
    fn run_update_unknown_task_fails() {
        let (_dir, project) = seeded();
        let args = UpdateArgs {
            payload: r#"{"tasks":[{"id":"nope","description":"x"}]}"#.into(),
        };
        assert!(run_update(&args, OutputMode::Json, &project).is_err());
    }
}
