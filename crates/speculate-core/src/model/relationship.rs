use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

use super::task::ParseEnumError;

/// Edge types between tasks.
///
/// Only [`RelationType::Blocks`] gates execution order; the other two are
/// informational and may form cycles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationType {
    /// `from` must be done before `to` can start.
    Blocks,
    /// Thematic link, no ordering.
    RelatesTo,
    /// `from` is part of the epic/group `to`.
    PartOf,
}

impl RelationType {
    pub const ALL: [Self; 3] = [Self::Blocks, Self::RelatesTo, Self::PartOf];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Blocks => "blocks",
            Self::RelatesTo => "relates_to",
            Self::PartOf => "part_of",
        }
    }
}

impl fmt::Display for RelationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RelationType {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "blocks" => Ok(Self::Blocks),
            "relates_to" => Ok(Self::RelatesTo),
            "part_of" => Ok(Self::PartOf),
            _ => Err(ParseEnumError {
                expected: "relationship type",
                got: s.to_string(),
            }),
        }
    }
}

/// A directed, typed edge between two task ids.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Relationship {
    pub from: String,
    pub to: String,
    #[serde(rename = "type")]
    pub kind: RelationType,
}

impl Relationship {
    pub fn new(from: impl Into<String>, to: impl Into<String>, kind: RelationType) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            kind,
        }
    }

    pub fn blocks(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self::new(from, to, RelationType::Blocks)
    }

    pub fn is_blocking(&self) -> bool {
        self.kind == RelationType::Blocks
    }

    pub fn is_self_loop(&self) -> bool {
        self.from == self.to
    }

    /// Returns `true` if either endpoint is `id`.
    pub fn touches(&self, id: &str) -> bool {
        self.from == id || self.to == id
    }
}

impl fmt::Display for Relationship {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -[{}]→ {}", self.from, self.kind, self.to)
    }
}
