use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// The three stored lifecycle states of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Pending,
    InProgress,
    Done,
}

impl TaskStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Done => "done",
        }
    }
}

/// Display state computed from a task's stored status and its blockers.
///
/// Never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DerivedStatus {
    Ready,
    Blocked,
    InProgress,
    Done,
}

impl DerivedStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ready => "ready",
            Self::Blocked => "blocked",
            Self::InProgress => "in-progress",
            Self::Done => "done",
        }
    }

    /// Single-character marker used in compact listings.
    pub const fn icon(self) -> &'static str {
        match self {
            Self::Ready | Self::Blocked => "○",
            Self::InProgress => "⟳",
            Self::Done => "✓",
        }
    }
}

/// One entry of a task's checklist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecklistItem {
    pub item: String,
    #[serde(default)]
    pub done: bool,
}

impl ChecklistItem {
    pub fn new(item: impl Into<String>) -> Self {
        Self {
            item: item.into(),
            done: false,
        }
    }
}

/// An atomic unit of work. The `id` is also the display name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(default)]
    pub acceptance_criteria: Vec<String>,
    #[serde(default)]
    pub checklist: Vec<ChecklistItem>,
    #[serde(default)]
    pub estimate_hours: Option<f64>,
}

impl Task {
    /// A pending task with no metadata.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            description: String::new(),
            status: TaskStatus::Pending,
            acceptance_criteria: Vec::new(),
            checklist: Vec::new(),
            estimate_hours: None,
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    #[must_use]
    pub const fn with_estimate(mut self, hours: f64) -> Self {
        self.estimate_hours = Some(hours);
        self
    }

    #[must_use]
    pub const fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = status;
        self
    }

    pub fn is_complete(&self) -> bool {
        self.status == TaskStatus::Done
    }

    /// Returns `(completed, total)` checklist entries.
    pub fn checklist_progress(&self) -> (usize, usize) {
        let completed = self.checklist.iter().filter(|c| c.done).count();
        (completed, self.checklist.len())
    }
}

/// Error returned when parsing an enum value from text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseEnumError {
    pub expected: &'static str,
    pub got: String,
}

impl fmt::Display for ParseEnumError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid {}: '{}'", self.expected, self.got)
    }
}

impl std::error::Error for ParseEnumError {}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for DerivedStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn normalize(input: &str) -> String {
    input.trim().to_ascii_lowercase().replace('-', "_")
}

impl FromStr for TaskStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "pending" => Ok(Self::Pending),
            "in_progress" => Ok(Self::InProgress),
            "done" => Ok(Self::Done),
            _ => Err(ParseEnumError {
                expected: "status",
                got: s.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_serializes_snake_case() {
        let json = serde_json::to_string(&TaskStatus::InProgress).unwrap();
        assert_eq!(json, "\"in_progress\"");
        let back: TaskStatus = serde_json::from_str("\"done\"").unwrap();
        assert_eq!(back, TaskStatus::Done);
    }

    #[test]
    fn derived_status_serializes_kebab_case() {
        let json = serde_json::to_string(&DerivedStatus::InProgress).unwrap();
        assert_eq!(json, "\"in-progress\"");
    }

    #[test]
    fn parse_accepts_hyphen_or_underscore() {
        assert_eq!("in-progress".parse::<TaskStatus>().unwrap(), TaskStatus::InProgress);
        assert_eq!(" Pending ".parse::<TaskStatus>().unwrap(), TaskStatus::Pending);
        assert!("started".parse::<TaskStatus>().is_err());
    }

    #[test]
    fn task_defaults_fill_missing_fields() {
        let task: Task = serde_json::from_str(r#"{"id": "design-api"}"#).unwrap();
        assert_eq!(task, Task::new("design-api"));
    }

    #[test]
    fn task_requires_id() {
        let err = serde_json::from_str::<Task>(r#"{"description": "x"}"#).unwrap_err();
        assert!(err.to_string().contains("id"));
    }

    #[test]
    fn checklist_progress_counts_done_items() {
        let mut task = Task::new("write-docs");
        assert_eq!(task.checklist_progress(), (0, 0));
        task.checklist = vec![
            ChecklistItem::new("outline"),
            ChecklistItem {
                item: "draft".into(),
                done: true,
            },
        ];
        assert_eq!(task.checklist_progress(), (1, 2));
    }
}
