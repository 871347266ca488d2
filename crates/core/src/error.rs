//! Domain-level error type shared across the workspace.

/// Errors produced by domain logic and surfaced through the API layer.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// An entity could not be found by its public identifier.
    #[error("{entity} with id {id} not found")]
    NotFound {
        entity: &'static str,
        id: String,
    },

    /// Invalid input from a caller.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The listing store is empty or unreachable; a scan cannot produce
    /// a meaningful report and must not return a partial one.
    #[error("Listing data unavailable: {0}")]
    DataUnavailable(String),

    /// An unexpected internal failure.
    #[error("Internal error: {0}")]
    Internal(String),
}
