//! Persisted data model: tasks, relationships and the graph that owns them.

pub mod graph;
pub mod relationship;
pub mod task;

pub use graph::Graph;
pub use relationship::{RelationType, Relationship};
pub use task::{ChecklistItem, DerivedStatus, Task, TaskStatus};
