//! Algorithms over the task graph.
//!
//! Everything here is a pure function of a [`Graph`](crate::model::Graph).
//!
//! ## Submodules
//!
//! - [`blocking`] — id-keyed `blocks` adjacency in both directions.
//! - [`cycles`] — incremental and full-graph cycle detection.
//! - [`naming`] — task id rules.
//! - [`status`] — derived ready / blocked / in-progress / done.
//! - [`impact`] — what completing a task would unblock.
//! - [`validate`] — full health audit.

pub mod blocking;
pub mod cycles;
pub mod impact;
pub mod naming;
pub mod status;
pub mod validate;

pub use blocking::BlockingIndex;
pub use impact::{Impact, downstream, impact_of};
pub use status::{derive_all, derive_status, derive_with_index};
pub use validate::{ValidationReport, validate, validate_with};
