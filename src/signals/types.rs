//! Signal tokens and the outcome they classify to.

use std::fmt;

pub const COMPLETE_TOKEN: &str = "FEATURE_COMPLETE";
pub const BLOCKED_TOKEN: &str = "FEATURE_BLOCKED";
pub const FAILED_TOKEN: &str = "FEATURE_FAILED";

/// Classification of one agent turn. Drives control flow only; never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IterationOutcome {
    Complete,
    Failed,
    Blocked,
    /// No token in the tail window; treated like `Complete`
    AssumedSuccess,
}

impl IterationOutcome {
    /// Whether this outcome leads to a commit and `done = true`.
    pub fn should_commit(self) -> bool {
        matches!(
            self,
            IterationOutcome::Complete | IterationOutcome::AssumedSuccess
        )
    }
}

impl fmt::Display for IterationOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IterationOutcome::Complete => write!(f, "complete"),
            IterationOutcome::Failed => write!(f, "failed"),
            IterationOutcome::Blocked => write!(f, "blocked"),
            IterationOutcome::AssumedSuccess => write!(f, "unknown-assume-success"),
        }
    }
}
