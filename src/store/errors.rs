use thiserror::Error;

use crate::records::{RecordError, RecordKind};

/// Failures reported by a [`DataStore`](super::DataStore) call
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StoreError {
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Could not reach the data store: {0}")]
    Connectivity(String),

    #[error("Operation '{operation}' timed out after {duration_ms}ms")]
    Timeout { operation: String, duration_ms: u64 },

    #[error("Constraint violation: {0}")]
    Constraint(String),

    #[error("{kind} '{id}' not found")]
    NotFound { kind: RecordKind, id: String },

    #[error("Invalid record: {0}")]
    InvalidRecord(#[from] RecordError),

    #[error("Data store error: {0}")]
    Other(String),
}
