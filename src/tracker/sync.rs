use std::path::PathBuf;
use tracing::{debug, info, warn};

use super::git::GitTracker;
use crate::backlog::{BacklogStore, Feature};
use crate::errors::TrackerError;
use crate::report::write_progress_file;

/// What the audit log did for a completed feature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitResult {
    Committed { sha: String, message: String },
    /// Working tree had nothing to stage; no empty commit was made
    NoChanges,
}

/// Records a successful iteration: commit the agent's changes, then mark the
/// feature done and refresh the progress report.
///
/// This is the only place `done` is ever set.
pub struct CommitSynchronizer {
    tracker: GitTracker,
    store: BacklogStore,
    progress_file: PathBuf,
}

impl CommitSynchronizer {
    pub fn new(tracker: GitTracker, store: BacklogStore, progress_file: PathBuf) -> Self {
        Self {
            tracker,
            store,
            progress_file,
        }
    }

    pub fn commit(&self, feature: &Feature) -> Result<CommitResult, TrackerError> {
        self.tracker.stage_all()?;

        let result = if self.tracker.has_staged_changes()? {
            let message = feature.commit_message();
            let sha = self.tracker.commit(&message)?;
            info!(sha = %sha, message = %message, "committed feature");
            CommitResult::Committed { sha, message }
        } else {
            debug!(id = feature.id, "nothing to commit");
            CommitResult::NoChanges
        };

        let backlog = self.store.mark_done(feature.id)?;
        // Already marked done; the report is best effort
        if let Err(e) = write_progress_file(&self.progress_file, &backlog) {
            warn!(
                path = %self.progress_file.display(),
                err = %e,
                "failed to write progress file"
            );
        }

        Ok(result)
    }
}
