//! Error types for invoking user callables

use thiserror::Error;

/// Result type alias for callable invocations
pub type Result<T> = std::result::Result<T, ValueError>;

/// Errors that can occur when a user callable is invoked
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ValueError {
    /// The user function itself reported a failure
    #[error("callable failed: {message}")]
    Failed { message: String },

    /// Arguments did not satisfy the callable's contract
    #[error("invalid arguments: {}", .issues.join("; "))]
    InvalidArguments { issues: Vec<String> },

    /// The user function returned a value violating its contract
    #[error("invalid return value: {}", .issues.join("; "))]
    InvalidReturn { issues: Vec<String> },

    /// The callable was invoked with a context of the wrong scope
    #[error("expected a {expected} context, received {received}")]
    ContextScope {
        expected: &'static str,
        received: &'static str,
    },
}

impl ValueError {
    /// Create a failure reported by user code
    pub fn failed(msg: impl Into<String>) -> Self {
        Self::Failed {
            message: msg.into(),
        }
    }
}
