use std::path::{Path, PathBuf};

use tracing::debug;

use super::types::Backlog;
use crate::errors::BacklogError;

/// File name of the backlog inside a project directory.
pub const DEFAULT_BACKLOG_FILE: &str = "feature_list.json";

/// Loads and saves the backlog file. Holds no cached state: every `load` is
/// authoritative.
#[derive(Debug, Clone)]
pub struct BacklogStore {
    path: PathBuf,
}

impl BacklogStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    pub fn load(&self) -> Result<Backlog, BacklogError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(BacklogError::Missing {
                    path: self.path.clone(),
                });
            }
            Err(source) => {
                return Err(BacklogError::ReadFailed {
                    path: self.path.clone(),
                    source,
                });
            }
        };

        let backlog =
            Backlog::from_json_str(&content).map_err(|reason| BacklogError::Malformed {
                path: self.path.clone(),
                reason,
            })?;
        debug!(
            path = %self.path.display(),
            shape = ?backlog.shape,
            features = backlog.features.len(),
            "loaded backlog"
        );
        Ok(backlog)
    }

    /// Write the backlog in the shape it was loaded with.
    pub fn save(&self, backlog: &Backlog) -> Result<(), BacklogError> {
        let mut content = backlog
            .to_json_string_pretty()
            .map_err(BacklogError::Serialize)?;
        content.push('\n');
        std::fs::write(&self.path, content).map_err(|source| BacklogError::WriteFailed {
            path: self.path.clone(),
            source,
        })
    }

    /// Re-read the file, flip `done` on feature `id`, and persist it.
    ///
    /// Reading fresh keeps any edits made while the agent was running.
    pub fn mark_done(&self, id: u64) -> Result<Backlog, BacklogError> {
        let mut backlog = self.load()?;
        if !backlog.mark_done(id) {
            return Err(BacklogError::UnknownFeature { id });
        }
        self.save(&backlog)?;
        debug!(id, "marked feature done");
        Ok(backlog)
    }
}
