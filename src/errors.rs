//! Typed error hierarchy for the autorun orchestrator.
//!
//! One enum per seam:
//! - `BacklogError` - loading and persisting the feature backlog
//! - `AgentError` - launching and supervising the agent process
//! - `TrackerError` - the git audit log
//! - `OrchestratorError` - what the loop itself can fail with

use std::path::PathBuf;
use thiserror::Error;

/// Errors from the backlog store.
#[derive(Debug, Error)]
pub enum BacklogError {
    #[error("No backlog found at {path}")]
    Missing { path: PathBuf },

    #[error("Malformed backlog at {path}: {reason}")]
    Malformed { path: PathBuf, reason: String },

    #[error("Failed to read backlog at {path}: {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write backlog at {path}: {source}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize backlog: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("Feature {id} is not in the backlog")]
    UnknownFeature { id: u64 },
}

impl BacklogError {
    /// True when the backlog file simply does not exist ("nothing to do").
    pub fn is_missing(&self) -> bool {
        matches!(self, BacklogError::Missing { .. })
    }
}

/// Errors from a single agent invocation. The loop treats all of them as an
/// iteration failure.
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("Failed to write prompt file at {path}: {source}")]
    PromptWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to spawn agent process `{command}`: {source}")]
    SpawnFailed {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read agent output: {0}")]
    StreamFailed(#[source] std::io::Error),

    #[error("Failed to wait for agent process: {0}")]
    WaitFailed(#[source] std::io::Error),
}

/// Errors from the git audit log.
#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("Git error: {0}")]
    Git(#[from] git2::Error),

    #[error(transparent)]
    Backlog(#[from] BacklogError),
}

/// Errors that stop the orchestrator loop.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error(transparent)]
    Backlog(#[from] BacklogError),
}
