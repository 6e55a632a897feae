//! Error types for the column schema crate

use thiserror::Error;

use crate::issue::SchemaValidationError;

/// Result type for column schema operations
pub type Result<T> = std::result::Result<T, ColumnsError>;

/// Errors that can occur outside of a candidate's own validity
#[derive(Debug, Error)]
pub enum ColumnsError {
    /// A candidate failed validation
    #[error(transparent)]
    Validation(#[from] SchemaValidationError),

    /// Two widget families registered the same tag without declaring it shared
    #[error("tag '{tag}' is registered by both '{first}' and '{second}'")]
    TagCollision {
        tag: String,
        first: &'static str,
        second: &'static str,
    },

    /// A family registered the same tag twice
    #[error("tag '{tag}' is registered twice in '{family}'")]
    DuplicateTag { tag: String, family: &'static str },

    /// Configuration could not be extracted
    #[error("configuration error: {0}")]
    Config(#[from] figment::Error),

    /// Configuration file format not supported
    #[error("unsupported configuration file format: '{format}'")]
    UnsupportedFormat { format: String },
}
