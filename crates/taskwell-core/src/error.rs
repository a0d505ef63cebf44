//! Domain-level error types.

use thiserror::Error;

/// Repository-level errors.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Constraint violation: {0}")]
    Constraint(String),

    #[error("Storage failure: {0}")]
    Storage(String),
}
