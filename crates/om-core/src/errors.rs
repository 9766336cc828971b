//! Cross-cutting error types.
//!
//! Domain-specific errors (`DatabaseError`, `AuthError`) are defined in their
//! respective crates. They converge into one `ApiError` in `om-cli` where every
//! failure becomes a response envelope.

use thiserror::Error;

/// Errors that can be raised by any `om-*` crate.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Entity lookup returned no result.
    #[error("Entity not found: {entity_type} {id}")]
    NotFound { entity_type: String, id: String },

    /// Input failed validation (out-of-range order, malformed field).
    #[error("Validation error: {0}")]
    Validation(String),

    /// Catch-all for unexpected errors.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
