//! Crate-wide error taxonomy.
//!
//! Every failure in the store and service layers is classified into one of
//! these kinds and propagated upward unchanged; only the HTTP layer turns
//! them into status codes.

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum TaskError {
    /// The caller supplied a missing or malformed required field.
    #[error("Invalid parameter {field}: {reason}")]
    InvalidParameter { field: String, reason: String },

    /// No record exists for the given id.
    #[error("Task {id} not found")]
    NotFound { id: Uuid },

    /// The backing store was unreachable or rejected the call for
    /// infrastructure reasons. Distinct from `NotFound` so callers can tell
    /// "not there" from "couldn't check".
    #[error("Data access error: {0}")]
    DataAccess(String),
}

impl TaskError {
    pub fn invalid_parameter(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

pub type TaskResult<T> = Result<T, TaskError>;
