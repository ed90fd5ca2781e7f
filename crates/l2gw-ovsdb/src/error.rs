//! Reconciliation error types

use l2gw_db::StoreError;
use thiserror::Error;

use crate::batch::ChangeKind;

/// Result type for reconciliation and port-event handling
pub type ReconcileResult<T> = Result<T, ReconcileError>;

/// Errors raised while applying a change batch or handling a port event.
///
/// A well-formed batch never fails because of missing references; only
/// shape problems and storage failures surface here.
#[derive(Debug, Error)]
pub enum ReconcileError {
    /// Batch names a kind outside the recognized set
    #[error("Unknown change kind '{0}'")]
    UnknownKind(String),

    /// A record does not match the schema of its kind
    #[error("Malformed {kind} record at index {index}: {reason}")]
    Malformed {
        kind: ChangeKind,
        index: usize,
        reason: String,
    },

    /// The batch envelope itself is unusable
    #[error("Invalid change batch: {0}")]
    InvalidBatch(String),

    /// MAC agent call failed
    #[error("MAC agent error: {0}")]
    Agent(String),

    /// Storage failure; the whole batch was rolled back
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ReconcileError {
    /// Returns the HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            ReconcileError::UnknownKind(_) => 400,
            ReconcileError::Malformed { .. } => 400,
            ReconcileError::InvalidBatch(_) => 400,
            ReconcileError::Agent(_) => 502,
            ReconcileError::Store(_) => 500,
        }
    }
}
