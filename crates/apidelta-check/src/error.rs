use apidelta_diff::DiffError;

/// Errors raised before or around rule evaluation. Rules themselves never
/// fail.
#[derive(Debug, thiserror::Error)]
pub enum CheckError {
    /// A configuration set names a rule the registry does not hold.
    #[error("unknown rule '{id}' in {field}")]
    UnknownRule { field: &'static str, id: String },

    /// Configuration is malformed or inconsistent.
    #[error("configuration error: {0}")]
    Config(String),

    /// The documents could not be compared.
    #[error(transparent)]
    Diff(#[from] DiffError),
}

/// Convenience alias for check results.
pub type CheckResult<T> = Result<T, CheckError>;
