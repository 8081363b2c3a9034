//! Error types for the pool module.

use std::path::PathBuf;
use thiserror::Error;

use super::types::{OutcomeKind, PoolState};

/// Fatal pool errors.
///
/// Per-item failures never show up here; they are routed to the outcome logs.
#[derive(Debug, Error)]
pub enum PoolError {
    /// Configuration rejected before any task was started.
    #[error("Invalid pool configuration: {0}")]
    InvalidConfig(String),

    /// Lifecycle operation called in the wrong state.
    #[error("Cannot {operation} a pool that is {state}")]
    InvalidState {
        operation: &'static str,
        state: PoolState,
    },

    /// Source root or category directory could not be listed.
    #[error("Failed to read source directory {path}: {source}")]
    SourceUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Target directory could not be created.
    #[error("Failed to create target directory {path}: {source}")]
    TargetDirFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Outcome log could not be opened for appending.
    #[error("Failed to open {kind} log {path}: {source}")]
    LogOpenFailed {
        kind: OutcomeKind,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Every consumer of the work queue is gone.
    #[error("Work queue closed")]
    QueueClosed,

    /// The work queue filled up while no worker was running to empty it.
    #[error("Work queue is full ({0} items) and no worker is running")]
    QueueFull(usize),

    /// A worker or logger task panicked.
    #[error("Pool task failed: {0}")]
    TaskFailed(String),
}

impl PoolError {
    pub(crate) fn invalid_state(operation: &'static str, state: PoolState) -> Self {
        Self::InvalidState { operation, state }
    }
}
