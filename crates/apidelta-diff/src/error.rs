//! Error types for the diff crate.

/// Structural-integrity failures. Any of these aborts the comparison; no
/// partial diff tree is returned.
#[derive(Debug, thiserror::Error)]
pub enum DiffError {
    /// `compare_schemas` was called with neither a base nor a revision.
    #[error("schema comparison needs a base or a revision schema")]
    MissingBothSides,

    /// Two path templates of one document map to the same match key.
    #[error("ambiguous endpoint in {document}: '{first}' and '{second}' both match '{key}'")]
    AmbiguousEndpoint {
        document: String,
        key: String,
        first: String,
        second: String,
    },

    /// A composition list holds an unusable `$ref`.
    #[error("malformed composition reference at {location}: {reason}")]
    MalformedReference { location: String, reason: String },
}

/// Convenience alias for diff results.
pub type DiffResult<T> = Result<T, DiffError>;
