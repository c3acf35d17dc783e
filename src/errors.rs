//! # Join Error Types
//!
//! Every fallible operation in the crate returns [`JoinError`].
//!
//! ## Error Categories
//!
//! - **Configuration**: required columns are missing or ambiguous, a prefix
//!   cannot be derived, or a join type is unknown. The caller must fix the
//!   input schema or pass explicit prefixes.
//! - **Empty input**: an operation that needs at least one row got none.
//! - **Malformed record**: a single row has the wrong structure (for example a
//!   relation cell that is not an object). The whole call is aborted.
//! - **Serialization**: reading or writing JSON failed.
//!
//! ## Usage Patterns
//!
//! ```ignore
//! JoinError::configuration_with_context(
//!     "column 't105_linkSequenceId' not found",
//!     "right table of overlap join",
//! )
//! ```

use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum JoinError {
    #[error("Configuration error: {message}")]
    Configuration { message: String },
    #[error("Empty input: {operation} requires at least one record")]
    EmptyInput { operation: String },
    #[error("Malformed record: {message}")]
    MalformedRecord { message: String },
    #[error("Serialization error: {message}")]
    Serialization { message: String },
}

pub type Result<T> = std::result::Result<T, JoinError>;

impl JoinError {
    pub fn configuration(message: impl Into<String>) -> Self {
        JoinError::Configuration {
            message: message.into(),
        }
    }

    /// Create a configuration error with context information
    ///
    /// # Example
    /// ```ignore
    /// JoinError::configuration_with_context(
    ///     "expected exactly one object type column, found 0: []",
    ///     "deriving prefix for right table",
    /// )
    /// ```
    pub fn configuration_with_context(
        message: impl Into<String>,
        context: impl Into<String>,
    ) -> Self {
        let msg = message.into();
        let ctx = context.into();
        JoinError::Configuration {
            message: format!("{}\n  Context: {}", msg, ctx),
        }
    }

    pub fn empty_input(operation: impl Into<String>) -> Self {
        JoinError::EmptyInput {
            operation: operation.into(),
        }
    }

    /// Create a malformed-record error naming the offending row
    pub fn malformed_row(row: usize, message: impl Into<String>) -> Self {
        JoinError::MalformedRecord {
            message: format!("row {}: {}", row, message.into()),
        }
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        JoinError::MalformedRecord {
            message: message.into(),
        }
    }
}

impl From<serde_json::Error> for JoinError {
    fn from(e: serde_json::Error) -> Self {
        JoinError::Serialization {
            message: e.to_string(),
        }
    }
}
