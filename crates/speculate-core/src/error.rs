use std::fmt;
use std::path::PathBuf;

use crate::lock::LockError;
use crate::model::task::DerivedStatus;

/// Machine-readable error codes for agent-friendly decision making.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    ConfigParseError,
    InvalidRequest,
    CycleDetected,
    DanglingEndpoint,
    NamingRule,
    SelfLoop,
    InvalidEstimate,
    TaskNotFound,
    NotReady,
    AlreadyDone,
    DuplicateTask,
    ImmutableField,
    HasDependents,
    CorruptStore,
    StoreWriteFailed,
    LockContention,
    InternalUnexpected,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::ConfigParseError => "E1001",
            Self::InvalidRequest => "E1002",
            Self::CycleDetected => "E2001",
            Self::DanglingEndpoint => "E2002",
            Self::NamingRule => "E2003",
            Self::SelfLoop => "E2004",
            Self::InvalidEstimate => "E2005",
            Self::TaskNotFound => "E3001",
            Self::NotReady => "E3002",
            Self::AlreadyDone => "E3003",
            Self::DuplicateTask => "E3004",
            Self::ImmutableField => "E3005",
            Self::HasDependents => "E3006",
            Self::CorruptStore => "E5001",
            Self::StoreWriteFailed => "E5002",
            Self::LockContention => "E5003",
            Self::InternalUnexpected => "E9001",
        }
    }

    /// Short human-facing summary for logs and terminal output.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::ConfigParseError => "Config file parse error",
            Self::InvalidRequest => "Malformed request payload",
            Self::CycleDetected => "Blocking cycle would be created",
            Self::DanglingEndpoint => "Relationship endpoint does not exist",
            Self::NamingRule => "Task ID violates naming rules",
            Self::SelfLoop => "Relationship points at its own source",
            Self::InvalidEstimate => "Estimate must be a positive number of hours",
            Self::TaskNotFound => "Task not found",
            Self::NotReady => "Task is not ready to start",
            Self::AlreadyDone => "Task is already done",
            Self::DuplicateTask => "Task ID already exists",
            Self::ImmutableField => "Field cannot be changed",
            Self::HasDependents => "Task still has relationships outside the deletion set",
            Self::CorruptStore => "Corrupt graph store",
            Self::StoreWriteFailed => "Graph store write failed",
            Self::LockContention => "Lock contention",
            Self::InternalUnexpected => "Internal unexpected error",
        }
    }

    /// Optional remediation hint that can be surfaced to operators and agents.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::ConfigParseError => Some("Fix syntax in .speculate/config.toml and retry."),
            Self::InvalidRequest => Some("Check the JSON payload against `spec <command> --help`."),
            Self::CycleDetected => {
                Some("Drop or reverse one `blocks` relationship so the graph stays acyclic.")
            }
            Self::DanglingEndpoint => {
                Some("Add the missing task in the same batch or fix the relationship ids.")
            }
            Self::NamingRule => {
                Some("Use kebab-case with at most 4 words and no \"and\", e.g. design-auth-flow.")
            }
            Self::SelfLoop => Some("Relationships must connect two different tasks."),
            Self::InvalidEstimate => Some("Use a positive estimate, ideally between 1 and 4 hours."),
            Self::TaskNotFound => Some("Run `spec available` to list known tasks."),
            Self::NotReady => Some("Complete the blocking tasks first (`spec show <id>`)."),
            Self::AlreadyDone => None,
            Self::DuplicateTask => Some("Pick a different ID or use `spec update` instead."),
            Self::ImmutableField => {
                Some("Task IDs are immutable; delete and re-add the task to rename it.")
            }
            Self::HasDependents => {
                Some("Delete the related tasks in the same batch or remove the relationships first.")
            }
            Self::CorruptStore => Some("Fix or restore .speculate/graph.json from version control."),
            Self::StoreWriteFailed => Some("Check disk space and write permissions."),
            Self::LockContention => Some("Retry after the other `spec` process releases its lock."),
            Self::InternalUnexpected => Some("Retry once. If persistent, report a bug with logs."),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

// ---------------------------------------------------------------------------
// Error families
// ---------------------------------------------------------------------------

/// Which endpoint of a relationship failed to resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingEndpoint {
    Source,
    Target,
    Both,
}

impl fmt::Display for MissingEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Source => "source missing",
            Self::Target => "target missing",
            Self::Both => "source and target missing",
        };
        f.write_str(s)
    }
}

/// Graph-shape violations. Always surfaced with the offending ids.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("blocking cycle: {}", .cycle.join(" → "))]
    Cycle { cycle: Vec<String> },

    #[error("relationship {from} → {to} references a missing task ({missing})")]
    DanglingEndpoint {
        from: String,
        to: String,
        missing: MissingEndpoint,
    },

    #[error("invalid task id '{id}': {reason}")]
    NamingRule { id: String, reason: String },

    #[error("{kind} relationship on '{id}' points at itself")]
    SelfLoop { id: String, kind: String },

    #[error("task '{id}' has invalid estimate {value}: must be positive")]
    InvalidEstimate { id: String, value: f64 },
}

impl ValidationError {
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Cycle { .. } => ErrorCode::CycleDetected,
            Self::DanglingEndpoint { .. } => ErrorCode::DanglingEndpoint,
            Self::NamingRule { .. } => ErrorCode::NamingRule,
            Self::SelfLoop { .. } => ErrorCode::SelfLoop,
            Self::InvalidEstimate { .. } => ErrorCode::InvalidEstimate,
        }
    }
}

/// Rejections of a single operation against the current graph state.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StateError {
    #[error("task not found: {id}")]
    NotFound { id: String },

    #[error("task '{id}' is {status}, only ready tasks can be started")]
    NotReady { id: String, status: DerivedStatus },

    #[error("task '{id}' is already done")]
    AlreadyDone { id: String },

    #[error("task id already exists: {id}")]
    DuplicateTask { id: String },

    #[error("field '{field}' of task '{id}' is immutable")]
    ImmutableField { id: String, field: &'static str },

    #[error("cannot delete '{id}': still related to '{other}' which is not being deleted")]
    HasDependents { id: String, other: String },
}

impl StateError {
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::NotFound { .. } => ErrorCode::TaskNotFound,
            Self::NotReady { .. } => ErrorCode::NotReady,
            Self::AlreadyDone { .. } => ErrorCode::AlreadyDone,
            Self::DuplicateTask { .. } => ErrorCode::DuplicateTask,
            Self::ImmutableField { .. } => ErrorCode::ImmutableField,
            Self::HasDependents { .. } => ErrorCode::HasDependents,
        }
    }
}

/// Failures reading or writing the persisted graph. Fatal for the invocation.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("corrupt graph store at {}: {reason}", .path.display())]
    Corrupt { path: PathBuf, reason: String },

    #[error("graph store I/O error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize graph: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("lock error: {0}")]
    Lock(#[from] LockError),
}

impl StoreError {
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Corrupt { .. } => ErrorCode::CorruptStore,
            Self::Io { .. } => ErrorCode::StoreWriteFailed,
            Self::Serialize(_) => ErrorCode::InternalUnexpected,
            Self::Lock(err) => err.code(),
        }
    }
}

/// A mutation payload that could not be parsed into a typed request.
#[derive(Debug, thiserror::Error)]
#[error("invalid request payload: {0}")]
pub struct RequestError(#[from] pub serde_json::Error);

impl RequestError {
    #[must_use]
    #[allow(clippy::unused_self)]
    pub const fn code(&self) -> ErrorCode {
        ErrorCode::InvalidRequest
    }
}

/// Any error the engine can return.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error(transparent)]
    Request(#[from] RequestError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    State(#[from] StateError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl EngineError {
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Request(err) => err.code(),
            Self::Validation(err) => err.code(),
            Self::State(err) => err.code(),
            Self::Store(err) => err.code(),
        }
    }

    /// Remediation hint for this error, if any.
    #[must_use]
    pub const fn hint(&self) -> Option<&'static str> {
        self.code().hint()
    }
}

pub type Result<T, E = EngineError> = std::result::Result<T, E>;
