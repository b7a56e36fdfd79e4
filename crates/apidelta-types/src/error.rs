use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("duplicate path template: {0}")]
    DuplicatePath(String),

    #[error("invalid sunset date '{value}': {reason}")]
    InvalidSunset { value: String, reason: String },

    #[error("unknown HTTP method: {0}")]
    UnknownMethod(String),
}
