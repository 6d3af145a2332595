//! Command handlers, one module per subcommand.

pub mod add;
pub mod after;
pub mod available;
pub mod complete;
pub mod completions;
pub mod delete;
pub mod show;
pub mod start;
pub mod update;
pub mod validate;

use std::io::Read;
use std::path::{Path, PathBuf};

use speculate_core::GraphStore;
use speculate_core::config::ProjectConfig;
use speculate_core::model::Graph;

use crate::output::{CliError, OutputMode, fail, render_error};

/// Project root plus its loaded config; every handler gets one.
#[derive(Debug, Clone)]
pub struct Project {
    pub root: PathBuf,
    pub config: ProjectConfig,
}

impl Project {
    pub const fn new(root: PathBuf, config: ProjectConfig) -> Self {
        Self { root, config }
    }

    /// Open the graph store configured for this project.
    pub fn store(&self) -> GraphStore {
        GraphStore::open(&self.root, &self.config.store)
    }

    /// Load the current graph, rendering any store error before returning it.
    pub fn load(&self, output: OutputMode) -> anyhow::Result<Graph> {
        self.store()
            .load()
            .map_err(|err| fail(output, err.into()))
    }

    /// Run one locked read-modify-write cycle, rendering any engine error.
    pub fn transact<T>(
        &self,
        output: OutputMode,
        f: impl FnOnce(&mut Graph) -> speculate_core::Result<T>,
    ) -> anyhow::Result<T> {
        self.store().transact(f).map_err(|err| fail(output, err))
    }

    #[cfg(test)]
    pub fn at(root: &Path) -> Self {
        Self::new(root.to_path_buf(), ProjectConfig::default())
    }
}

/// Resolve a payload argument: `-` reads stdin, `@path` reads a file
/// relative to the project root, anything else is the JSON itself.
pub fn read_payload(raw: &str, root: &Path, output: OutputMode) -> anyhow::Result<String> {
    let loaded = if raw == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .map(|_| buf)
            .map_err(|e| (String::from("stdin"), e))
    } else if let Some(path) = raw.strip_prefix('@') {
        let path = root.join(path);
        std::fs::read_to_string(&path).map_err(|e| (path.display().to_string(), e))
    } else {
        return Ok(raw.to_string());
    };

    match loaded {
        Ok(body) => Ok(body),
        Err((source, err)) => {
            render_error(
                output,
                &CliError::with_details(
                    format!("failed to read payload from {source}: {err}"),
                    "pass the JSON inline, as @path/to/file.json, or via stdin with -",
                    "payload_unreadable",
                ),
            )?;
            anyhow::bail!("failed to read payload from {source}: {err}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn inline_payload_is_returned_as_is() {
        let dir = TempDir::new().unwrap();
        let body = read_payload(r#"{"tasks":[]}"#, dir.path(), OutputMode::Text).unwrap();
        assert_eq!(body, r#"{"tasks":[]}"#);
    }

    #[test]
    fn at_path_reads_relative_to_root() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("batch.json"), r#"{"tasks":[{"id":"a"}]}"#).unwrap();
        let body = read_payload("@batch.json", dir.path(), OutputMode::Text).unwrap();
        assert!(body.contains("\"a\""));
    }

    #[test]
    fn missing_payload_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        assert!(read_payload("@nope.json", dir.path(), OutputMode::Json).is_err());
    }

    #[test]
    fn project_store_uses_configured_file() {
        let dir = TempDir::new().unwrap();
        let mut config = ProjectConfig::default();
        config.store.file = PathBuf::from("other.json");
        let project = Project::new(dir.path().to_path_buf(), config);
        assert!(project.store().path().ends_with("other.json"));
    }

    #[test]
    fn loading_missing_store_gives_empty_graph() {
        let dir = TempDir::new().unwrap();
        let graph = Project::at(dir.path()).load(OutputMode::Text).unwrap();
        assert!(graph.is_empty());
    }
}
