//! Schema issues: what a schema reports when it rejects a value.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One step into a nested value: an object key or an array index.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PathSegment {
    Index(u64),
    Key(String),
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Index(i) => write!(f, "{}", i),
            PathSegment::Key(k) => f.write_str(k),
        }
    }
}

impl From<&str> for PathSegment {
    fn from(key: &str) -> Self {
        PathSegment::Key(key.to_string())
    }
}

impl From<String> for PathSegment {
    fn from(key: String) -> Self {
        PathSegment::Key(key)
    }
}

impl From<usize> for PathSegment {
    fn from(index: usize) -> Self {
        PathSegment::Index(index as u64)
    }
}

/// A single validation issue.
///
/// Unknown fields are ignored when deserializing, so issue lists produced by
/// richer validators (with codes, expected/received types, ...) still decode.
/// Both `message` and `path` are required.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    /// Human-readable description of the problem.
    pub message: String,
    /// Location of the offending value, outermost segment first.
    pub path: Vec<PathSegment>,
}

impl Issue {
    /// Create an issue at the given path.
    pub fn new(message: impl Into<String>, path: Vec<PathSegment>) -> Self {
        Self {
            message: message.into(),
            path,
        }
    }

    /// Create an issue about the value itself (empty path).
    pub fn root(message: impl Into<String>) -> Self {
        Self::new(message, Vec::new())
    }

    /// Path segments joined with `.`, e.g. `items.2.name`.
    pub fn dotted_path(&self) -> String {
        self.path
            .iter()
            .map(|segment| segment.to_string())
            .collect::<Vec<_>>()
            .join(".")
    }
}

/// Failure reported by a schema.
///
/// Structured issue lists and opaque messages are told apart once, when the
/// error is constructed, so consumers never have to sniff message text.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SchemaError {
    /// Structured, ordered issue list. Displays as the JSON-encoded list.
    #[error("{}", render_issues(.0))]
    Issues(Vec<Issue>),
    /// Free-form message with no structure.
    #[error("{0}")]
    Message(String),
}

impl SchemaError {
    /// Classify a raw validator message.
    ///
    /// A message holding a non-empty JSON array of `{message, path}` objects
    /// becomes [`SchemaError::Issues`]; anything else, including issues
    /// without a `path`, stays a plain message.
    pub fn from_message(message: impl Into<String>) -> Self {
        let message = message.into();
        match serde_json::from_str::<Vec<Issue>>(message.trim()) {
            Ok(issues) if !issues.is_empty() => SchemaError::Issues(issues),
            _ => SchemaError::Message(message),
        }
    }

    /// The first issue, if this error is structured.
    pub fn first_issue(&self) -> Option<&Issue> {
        match self {
            SchemaError::Issues(issues) => issues.first(),
            SchemaError::Message(_) => None,
        }
    }
}

impl From<Vec<Issue>> for SchemaError {
    fn from(issues: Vec<Issue>) -> Self {
        SchemaError::Issues(issues)
    }
}

fn render_issues(issues: &[Issue]) -> String {
    serde_json::to_string_pretty(issues).unwrap_or_else(|_| format!("{:?}", issues))
}
