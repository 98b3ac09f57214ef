//! Error types for the core library

use thiserror::Error;

/// Errors produced while handling identifiers.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GuidError {
    /// The string is not a well-formed 128-bit identifier
    #[error("malformed guid `{value}`: {reason}")]
    Malformed { value: String, reason: String },

    /// The value had no string form to parse
    #[error("expected a guid string, found {0}")]
    NotAString(String),
}

/// Result type alias
pub type Result<T> = core::result::Result<T, GuidError>;
