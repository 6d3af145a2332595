#![forbid(unsafe_code)]
//! speculate-core library.
//!
//! Task graph engine: the persisted model, structural validation, derived
//! status, mutations, impact analysis and diagram projection.
//!
//! # Conventions
//!
//! - **Errors**: `thiserror` enums from [`error`]; `anyhow::Result` only at
//!   the config boundary.
//! - **Logging**: Use `tracing` macros (`info!`, `warn!`, `debug!`, `trace!`).
//!
//! # Lifecycle
//!
//! ```rust,no_run
//! use speculate_core::config::StoreConfig;
//! use speculate_core::error::EngineError;
//! use speculate_core::mutation::{self, request};
//! use speculate_core::store::GraphStore;
//!
//! # fn main() -> Result<(), EngineError> {
//! let store = GraphStore::open(std::path::Path::new("."), &StoreConfig::default());
//! let req = request::from_json(r#"{"tasks":[{"id":"design-api"}]}"#)?;
//! store.transact(|graph| mutation::add(graph, req))?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod diagram;
pub mod error;
pub mod graph;
pub mod lock;
pub mod model;
pub mod mutation;
pub mod store;

pub use error::{EngineError, ErrorCode, Result};
pub use model::{DerivedStatus, Graph, RelationType, Relationship, Task, TaskStatus};
pub use store::GraphStore;
