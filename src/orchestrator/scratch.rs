//! Scratch prompt file handed to the agent process.

use std::fs::File;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::errors::AgentError;

/// A prompt written to disk for the lifetime of one agent run.
///
/// The file is removed when the guard drops, whether the run finished, failed,
/// or its future was cancelled by an interrupt.
#[derive(Debug)]
pub struct ScratchPrompt {
    path: PathBuf,
}

impl ScratchPrompt {
    pub fn create(path: &Path, prompt: &str) -> Result<Self, AgentError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| AgentError::PromptWriteFailed {
                path: path.to_path_buf(),
                source,
            })?;
        }
        std::fs::write(path, prompt).map_err(|source| AgentError::PromptWriteFailed {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), chars = prompt.len(), "wrote scratch prompt");
        Ok(Self {
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Open the prompt for reading, to become the child's stdin.
    pub fn open(&self) -> Result<File, AgentError> {
        File::open(&self.path).map_err(|source| AgentError::PromptWriteFailed {
            path: self.path.clone(),
            source,
        })
    }
}

impl Drop for ScratchPrompt {
    fn drop(&mut self) {
        match std::fs::remove_file(&self.path) {
            Ok(()) => debug!(path = %self.path.display(), "removed scratch prompt"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!(path = %self.path.display(), err = %e, "failed to remove scratch prompt"),
        }
    }
}

/// Remove a scratch file left behind by a previous, killed run.
pub fn remove_stale(path: &Path) {
    if path.exists() {
        warn!(path = %path.display(), "removing stale scratch prompt");
        let _ = std::fs::remove_file(path);
    }
}
