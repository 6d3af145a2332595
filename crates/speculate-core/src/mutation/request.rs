//! Typed mutation payloads.
//!
//! Every mutation arrives as JSON and is parsed here, at the boundary, into
//! a closed struct. Unknown fields are rejected so typos fail loudly instead
//! of being ignored deep inside the engine.
//!
//! ```json
//! {"tasks": [{"id": "design-api", "estimate_hours": 2}],
//!  "relationships": [{"from": "design-api", "to": "build-api", "type": "blocks"}]}
//! ```

#![allow(clippy::module_name_repetitions)]

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::RequestError;
use crate::model::{ChecklistItem, RelationType, Relationship, Task, TaskStatus};

/// Parse a JSON payload into one of the request types.
///
/// # Errors
///
/// [`RequestError`] when the payload is not valid JSON or does not match
/// the request shape.
pub fn from_json<T: DeserializeOwned>(raw: &str) -> Result<T, RequestError> {
    Ok(serde_json::from_str(raw)?)
}

/// A task to create. Mirrors [`Task`] but rejects unknown fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewTask {
    pub id: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub estimate_hours: Option<f64>,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(default)]
    pub acceptance_criteria: Vec<String>,
    #[serde(default)]
    pub checklist: Vec<ChecklistItem>,
}

impl NewTask {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            description: String::new(),
            estimate_hours: None,
            status: TaskStatus::Pending,
            acceptance_criteria: Vec::new(),
            checklist: Vec::new(),
        }
    }

    pub fn into_task(self) -> Task {
        Task {
            id: self.id,
            description: self.description,
            status: self.status,
            acceptance_criteria: self.acceptance_criteria,
            checklist: self.checklist,
            estimate_hours: self.estimate_hours,
        }
    }
}

/// `spec add` payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AddRequest {
    #[serde(default)]
    pub tasks: Vec<NewTask>,
    #[serde(default)]
    pub relationships: Vec<Relationship>,
}

/// Fields to merge into an existing task. Absent fields are left alone.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TaskPatch {
    pub id: String,
    /// Present only so a rename attempt is rejected explicitly.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimate_hours: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub acceptance_criteria: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checklist: Option<Vec<ChecklistItem>>,
}

impl TaskPatch {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    /// Apply every present field to `task`. The id is never touched.
    pub fn apply(&self, task: &mut Task) {
        if let Some(description) = &self.description {
            task.description.clone_from(description);
        }
        if let Some(hours) = self.estimate_hours {
            task.estimate_hours = Some(hours);
        }
        if let Some(status) = self.status {
            task.status = status;
        }
        if let Some(criteria) = &self.acceptance_criteria {
            task.acceptance_criteria.clone_from(criteria);
        }
        if let Some(checklist) = &self.checklist {
            task.checklist.clone_from(checklist);
        }
    }
}

/// `spec update` payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateRequest {
    pub tasks: Vec<TaskPatch>,
}

/// Matches relationships by endpoints, optionally by type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RelationshipSelector {
    pub from: String,
    pub to: String,
    /// `None` matches every type between the pair.
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<RelationType>,
}

impl RelationshipSelector {
    pub fn matches(&self, rel: &Relationship) -> bool {
        rel.from == self.from && rel.to == self.to && self.kind.is_none_or(|k| k == rel.kind)
    }
}

/// `spec delete` payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DeleteRequest {
    /// Task ids to remove.
    #[serde(default)]
    pub tasks: Vec<String>,
    /// Relationships to remove, processed before the tasks.
    #[serde(default)]
    pub relationships: Vec<RelationshipSelector>,
}
