use std::fmt;

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Diagram,
    Node,
    Edge,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Diagram => "diagram",
            EntityKind::Node => "node",
            EntityKind::Edge => "edge",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failures reported by the editor core.
///
/// None of these are fatal: `NotFound` and `InvalidEndpoints` are routinely
/// produced by speculative pointer events and leave state untouched.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EditorError {
    #[error("{kind} '{id}' not found")]
    NotFound { kind: EntityKind, id: String },

    #[error("cannot connect '{from}' to '{to}': {reason}")]
    InvalidEndpoints {
        from: String,
        to: String,
        reason: &'static str,
    },

    #[error("invalid document: {0}")]
    InvalidFormat(String),
}

impl EditorError {
    pub fn not_found(kind: EntityKind, id: impl fmt::Display) -> Self {
        EditorError::NotFound {
            kind,
            id: id.to_string(),
        }
    }

    pub fn invalid_endpoints(
        from: impl fmt::Display,
        to: impl fmt::Display,
        reason: &'static str,
    ) -> Self {
        EditorError::InvalidEndpoints {
            from: from.to_string(),
            to: to.to_string(),
            reason,
        }
    }

    pub fn invalid_format(message: impl Into<String>) -> Self {
        EditorError::InvalidFormat(message.into())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, EditorError::NotFound { .. })
    }
}

pub type Result<T, E = EditorError> = std::result::Result<T, E>;
