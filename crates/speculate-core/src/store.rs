//! JSON file store for the task graph.
//!
//! A [`GraphStore`] is an explicit handle on one project's
//! `.speculate/graph.json`. Commands open it, then either [`load`] for reads
//! or [`transact`] for writes.
//!
//! Saves never leave a partial file behind: the document is written to a
//! temporary file in the same directory, synced, then renamed over the
//! target. Readers see either the previous or the new state.
//!
//! [`load`]: GraphStore::load
//! [`transact`]: GraphStore::transact

#![allow(clippy::module_name_repetitions)]

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use tempfile::NamedTempFile;
use tracing::{debug, instrument};

use crate::config::{STATE_DIR, StoreConfig};
use crate::error::StoreError;
use crate::lock::StoreLock;
use crate::model::Graph;

/// Name of the advisory lock file next to the graph.
pub const LOCK_FILE: &str = "graph.lock";

/// Handle on a project's persisted graph.
#[derive(Debug, Clone)]
pub struct GraphStore {
    path: PathBuf,
    lock_path: PathBuf,
    lock_timeout: Duration,
}

impl GraphStore {
    /// Open the store of the project rooted at `root`. Touches no files.
    pub fn open(root: &Path, config: &StoreConfig) -> Self {
        let state_dir = root.join(STATE_DIR);
        Self {
            path: state_dir.join(&config.file),
            lock_path: state_dir.join(LOCK_FILE),
            lock_timeout: config.lock_timeout(),
        }
    }

    /// Path of the graph document.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the persisted graph. A missing file is an empty graph.
    ///
    /// # Errors
    ///
    /// [`StoreError::Corrupt`] when the document is not valid JSON, misses
    /// required fields, or files a task under a key that differs from its id.
    /// [`StoreError::Io`] for any other read failure.
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub fn load(&self) -> Result<Graph, StoreError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!("no graph file yet, starting empty");
                return Ok(Graph::new());
            }
            Err(source) => {
                return Err(StoreError::Io {
                    path: self.path.clone(),
                    source,
                });
            }
        };

        let graph: Graph = serde_json::from_str(&content).map_err(|err| StoreError::Corrupt {
            path: self.path.clone(),
            reason: err.to_string(),
        })?;

        if let Some((key, task)) = graph.tasks.iter().find(|(key, task)| **key != task.id) {
            return Err(StoreError::Corrupt {
                path: self.path.clone(),
                reason: format!("task filed under '{key}' has id '{}'", task.id),
            });
        }

        debug!(
            tasks = graph.tasks.len(),
            relationships = graph.relationships.len(),
            "graph loaded"
        );
        Ok(graph)
    }

    /// Atomically replace the persisted graph with `graph`.
    ///
    /// Creates `.speculate/` when missing.
    ///
    /// # Errors
    ///
    /// [`StoreError::Io`] if the directory, temp file, sync or rename fails.
    #[instrument(skip_all, fields(path = %self.path.display()))]
    pub fn save(&self, graph: &Graph) -> Result<(), StoreError> {
        let dir = self.path.parent().unwrap_or_else(|| Path::new("."));
        fs::create_dir_all(dir).map_err(|source| self.io_error(source))?;

        let mut body = serde_json::to_string_pretty(graph)?;
        body.push('\n');

        let mut tmp = NamedTempFile::new_in(dir).map_err(|source| self.io_error(source))?;
        tmp.write_all(body.as_bytes())
            .map_err(|source| self.io_error(source))?;
        tmp.as_file()
            .sync_all()
            .map_err(|source| self.io_error(source))?;
        tmp.persist(&self.path)
            .map_err(|err| self.io_error(err.error))?;

        debug!(bytes = body.len(), "graph saved");
        Ok(())
    }

    /// Run `f` against the current graph under the store lock.
    ///
    /// Lock, load, mutate, save, unlock. The graph is written back only when
    /// `f` succeeds and actually changed it; on error nothing is persisted.
    ///
    /// # Errors
    ///
    /// Whatever `f` returns, or a [`StoreError`] from locking, loading or
    /// saving.
    pub fn transact<T, E>(&self, f: impl FnOnce(&mut Graph) -> Result<T, E>) -> Result<T, E>
    where
        E: From<StoreError>,
    {
        let lock = StoreLock::acquire(&self.lock_path, self.lock_timeout).map_err(StoreError::from)?;

        let mut graph = self.load()?;
        let before = graph.clone();
        let out = f(&mut graph)?;

        if graph == before {
            debug!("graph unchanged, skipping save");
        } else {
            self.save(&graph)?;
        }

        lock.release();
        Ok(out)
    }

    fn io_error(&self, source: io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }
}
