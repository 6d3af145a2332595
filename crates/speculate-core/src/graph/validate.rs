//! Graph health audit.
//!
//! [`validate`] runs every structural check over a [`Graph`] and collects the
//! findings into a [`ValidationReport`]. It never mutates and never stops at
//! the first problem. The mutation engine prevents these states from being
//! committed; the audit exists for hand-edited or legacy stores.
//!
//! Checks:
//!
//! - cycles in the `blocks` subgraph ([`super::cycles::find_all_cycles`])
//! - relationships whose endpoints do not resolve to tasks
//! - self-referencing relationships of any type
//! - task ids that break the naming rules ([`super::naming`])
//! - non-positive estimates
//! - isolated tasks (advisory only)

#![allow(clippy::must_use_candidate, clippy::module_name_repetitions)]

use serde::Serialize;
use tracing::warn;

use super::cycles::find_all_cycles;
use super::naming::check_task_id;
use crate::config::ValidateConfig;
use crate::error::{MissingEndpoint, ValidationError};
use crate::model::{Graph, RelationType, Relationship};

/// A relationship with at least one endpoint that is not a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DanglingEndpoint {
    pub from: String,
    pub to: String,
    #[serde(rename = "type")]
    pub kind: RelationType,
    pub missing: MissingEndpoint,
}

/// A task id that breaks the naming rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NamingFinding {
    pub id: String,
    pub reason: String,
}

/// A task whose estimate is zero, negative or not a number.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EstimateFinding {
    pub id: String,
    pub value: f64,
}

/// Everything [`validate`] found.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ValidationReport {
    /// One ordered path per cyclic component, e.g. `[a, b, a]`.
    pub cycles: Vec<Vec<String>>,
    pub dangling: Vec<DanglingEndpoint>,
    pub self_loops: Vec<Relationship>,
    pub naming: Vec<NamingFinding>,
    pub estimates: Vec<EstimateFinding>,
    /// Tasks with no relationships at all. Advisory.
    pub isolated: Vec<String>,
}

impl ValidationReport {
    /// `true` when nothing but advisory findings were reported.
    pub fn is_healthy(&self) -> bool {
        self.cycles.is_empty()
            && self.dangling.is_empty()
            && self.self_loops.is_empty()
            && self.naming.is_empty()
            && self.estimates.is_empty()
    }

    /// Number of non-advisory findings.
    pub fn problem_count(&self) -> usize {
        self.cycles.len()
            + self.dangling.len()
            + self.self_loops.len()
            + self.naming.len()
            + self.estimates.len()
    }

    /// The non-advisory findings as typed errors, in report order.
    pub fn errors(&self) -> Vec<ValidationError> {
        let cycles = self
            .cycles
            .iter()
            .map(|cycle| ValidationError::Cycle { cycle: cycle.clone() });
        let dangling = self.dangling.iter().map(|d| ValidationError::DanglingEndpoint {
            from: d.from.clone(),
            to: d.to.clone(),
            missing: d.missing,
        });
        let self_loops = self.self_loops.iter().map(|r| ValidationError::SelfLoop {
            id: r.from.clone(),
            kind: r.kind.to_string(),
        });
        let naming = self.naming.iter().map(|n| ValidationError::NamingRule {
            id: n.id.clone(),
            reason: n.reason.clone(),
        });
        let estimates = self.estimates.iter().map(|e| ValidationError::InvalidEstimate {
            id: e.id.clone(),
            value: e.value,
        });

        cycles
            .chain(dangling)
            .chain(self_loops)
            .chain(naming)
            .chain(estimates)
            .collect()
    }
}

/// Audit `graph` with default settings.
pub fn validate(graph: &Graph) -> ValidationReport {
    validate_with(graph, &ValidateConfig::default())
}

/// Audit `graph`.
pub fn validate_with(graph: &Graph, config: &ValidateConfig) -> ValidationReport {
    let mut report = ValidationReport {
        cycles: find_all_cycles(graph),
        ..ValidationReport::default()
    };

    for rel in &graph.relationships {
        let missing = match (graph.contains(&rel.from), graph.contains(&rel.to)) {
            (true, true) => None,
            (false, true) => Some(MissingEndpoint::Source),
            (true, false) => Some(MissingEndpoint::Target),
            (false, false) => Some(MissingEndpoint::Both),
        };
        if let Some(missing) = missing {
            report.dangling.push(DanglingEndpoint {
                from: rel.from.clone(),
                to: rel.to.clone(),
                kind: rel.kind,
                missing,
            });
        }
        if rel.is_self_loop() {
            report.self_loops.push(rel.clone());
        }
    }

    for (id, task) in &graph.tasks {
        if let Err(violation) = check_task_id(id) {
            report.naming.push(NamingFinding {
                id: id.clone(),
                reason: violation.to_string(),
            });
        }
        if let Some(value) = task.estimate_hours {
            if value.is_nan() || value <= 0.0 {
                report.estimates.push(EstimateFinding {
                    id: id.clone(),
                    value,
                });
            }
        }
        if config.report_isolated && graph.relationships_of(id).next().is_none() {
            report.isolated.push(id.clone());
        }
    }

    for err in report.errors() {
        warn!(code = %err.code(), "{err}");
    }

    report
}
