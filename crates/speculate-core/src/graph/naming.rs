//! Task id naming rules.
//!
//! A task id is its display name, so ids are kept short and atomic:
//!
//! - kebab-case: lowercase ASCII letters and digits joined by single hyphens
//! - at most [`MAX_WORDS`] hyphen-separated words
//! - no word equal to `and` (a task that needs "and" is two tasks)

use std::fmt;

/// Maximum number of hyphen-separated words in a task id.
pub const MAX_WORDS: usize = 4;

/// Why an id was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NamingViolation {
    Empty,
    Uppercase,
    Whitespace,
    NotKebabCase,
    TooManyWords { words: usize },
    ContainsAnd,
}

impl fmt::Display for NamingViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => f.write_str("must not be empty"),
            Self::Uppercase => f.write_str("must be lowercase"),
            Self::Whitespace => f.write_str("must use hyphens, not spaces"),
            Self::NotKebabCase => {
                f.write_str("must be kebab-case (lowercase alphanumeric words joined by single hyphens)")
            }
            Self::TooManyWords { words } => {
                write!(f, "has {words} words, max {MAX_WORDS} allowed")
            }
            Self::ContainsAnd => f.write_str("must not contain \"and\"; split it into two tasks"),
        }
    }
}

/// Check `id` against the naming rules, reporting the first violation.
pub fn check_task_id(id: &str) -> Result<(), NamingViolation> {
    if id.is_empty() {
        return Err(NamingViolation::Empty);
    }
    if id.chars().any(char::is_uppercase) {
        return Err(NamingViolation::Uppercase);
    }
    if id.chars().any(char::is_whitespace) {
        return Err(NamingViolation::Whitespace);
    }

    let words: Vec<&str> = id.split('-').collect();
    let well_formed = words.iter().all(|w| {
        !w.is_empty() && w.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
    });
    if !well_formed {
        return Err(NamingViolation::NotKebabCase);
    }

    if words.len() > MAX_WORDS {
        return Err(NamingViolation::TooManyWords { words: words.len() });
    }
    if words.contains(&"and") {
        return Err(NamingViolation::ContainsAnd);
    }
    Ok(())
}
