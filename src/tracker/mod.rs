//! The git audit log: one commit per completed feature.

mod git;
mod sync;

pub use git::GitTracker;
pub use sync::{CommitResult, CommitSynchronizer};
