//! Error types for sketch operations.

use std::fmt;

/// Errors that can occur while constructing, updating, or parsing a sketch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SketchError {
    /// A value passed to an operation failed a precondition (e.g. a hashed
    /// input shorter than the minimum required length).
    InvalidArgument {
        /// Argument name.
        param: String,
        /// Invalid value provided, rendered for diagnostics.
        value: String,
        /// Constraint that was violated.
        constraint: String,
    },

    /// The sketch reached a state that should be unreachable under correct
    /// usage (e.g. the fold offset invariant fails after the pre-merge swap).
    InvalidState {
        /// What invariant was found broken.
        reason: String,
    },

    /// A byte buffer could not be parsed as a sketch: malformed header,
    /// truncated payload, unsupported version byte, or a length mismatch.
    DeserializationError(String),
}

impl fmt::Display for SketchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SketchError::InvalidArgument {
                param,
                value,
                constraint,
            } => {
                write!(
                    f,
                    "invalid argument '{param}': value '{value}' {constraint}"
                )
            }
            SketchError::InvalidState { reason } => write!(f, "invalid sketch state: {reason}"),
            SketchError::DeserializationError(msg) => write!(f, "deserialization error: {msg}"),
        }
    }
}

impl std::error::Error for SketchError {}

/// Result type alias for sketch operations.
pub type Result<T> = std::result::Result<T, SketchError>;
