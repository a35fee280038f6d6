use git2::{IndexAddOption, Repository, Signature};
use std::path::Path;
use tracing::{debug, info};

use crate::errors::TrackerError;

/// Thin wrapper over the project's git repository.
pub struct GitTracker {
    repo: Repository,
}

impl GitTracker {
    pub fn open(project_dir: &Path) -> Result<Self, TrackerError> {
        let repo = Repository::open(project_dir)?;
        Ok(Self { repo })
    }

    /// Open the repository at `project_dir`, initialising one if there is none.
    pub fn open_or_init(project_dir: &Path) -> Result<Self, TrackerError> {
        match Repository::open(project_dir) {
            Ok(repo) => Ok(Self { repo }),
            Err(e) if e.code() == git2::ErrorCode::NotFound => {
                info!(path = %project_dir.display(), "initialising git repository");
                let repo = Repository::init(project_dir)?;
                Ok(Self { repo })
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Stage every change in the working tree, deletions included (`git add -A`).
    pub fn stage_all(&self) -> Result<(), TrackerError> {
        let mut index = self.repo.index()?;
        index.add_all(["*"].iter(), IndexAddOption::DEFAULT, None)?;
        index.update_all(["*"].iter(), None)?;
        index.write()?;
        Ok(())
    }

    /// Whether the index differs from HEAD (or holds anything, on an unborn branch).
    pub fn has_staged_changes(&self) -> Result<bool, TrackerError> {
        let index = self.repo.index()?;
        let head_tree = match self.get_head_commit() {
            Some(commit) => Some(commit.tree()?),
            None => None,
        };
        let diff = self
            .repo
            .diff_tree_to_index(head_tree.as_ref(), Some(&index), None)?;
        let changed = diff.deltas().len();
        debug!(changed, "staged changes");
        Ok(changed > 0)
    }

    /// Commit the current index on HEAD and return the new commit SHA.
    pub fn commit(&self, message: &str) -> Result<String, TrackerError> {
        let mut index = self.repo.index()?;
        let tree_id = index.write_tree()?;
        let tree = self.repo.find_tree(tree_id)?;
        let sig = self.signature()?;

        // Unborn branch: the first commit has no parent
        let parents: Vec<git2::Commit<'_>> = self.get_head_commit().into_iter().collect();
        let parent_refs: Vec<&git2::Commit<'_>> = parents.iter().collect();

        let commit_id = self
            .repo
            .commit(Some("HEAD"), &sig, &sig, message, &tree, &parent_refs)?;
        Ok(commit_id.to_string())
    }

    /// Get current HEAD SHA (returns None for unborn branches)
    pub fn head_sha(&self) -> Option<String> {
        self.get_head_commit().map(|c| c.id().to_string())
    }

    /// Get the HEAD commit if it exists (returns None for unborn branches)
    fn get_head_commit(&self) -> Option<git2::Commit<'_>> {
        self.repo
            .head()
            .ok()
            .and_then(|head| head.peel_to_commit().ok())
    }

    /// The configured git identity, or a fixed fallback when none is set.
    fn signature(&self) -> Result<Signature<'static>, TrackerError> {
        match self.repo.signature() {
            Ok(sig) => Ok(sig),
            Err(_) => Ok(Signature::now("autorun", "autorun@localhost")?),
        }
    }
}
