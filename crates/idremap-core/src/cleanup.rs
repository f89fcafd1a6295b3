//! Scoped removal of staging leftovers
//!
//! A [`CleanupGuard`] is acquired before staging begins and removes
//! whatever staging files still exist when it goes out of scope, whether
//! the run succeeded, failed validation, or failed during commit.
//! Removal is best-effort: a staging file that was already promoted (or
//! never created) is simply absent.

use std::fs;
use std::path::PathBuf;

use crate::target::FileSet;

/// Removes leftover staging files when dropped
#[derive(Debug)]
pub struct CleanupGuard {
    staging_paths: Vec<PathBuf>,
}

impl CleanupGuard {
    /// Acquire the guard over a run's staging paths
    #[must_use]
    pub fn new(files: &FileSet) -> Self {
        Self {
            staging_paths: vec![
                files.accounts().staging_path().to_path_buf(),
                files.groups().staging_path().to_path_buf(),
            ],
        }
    }
}

impl Drop for CleanupGuard {
    fn drop(&mut self) {
        for path in &self.staging_paths {
            if !path.is_file() {
                continue;
            }
            match fs::remove_file(path) {
                Ok(()) => tracing::debug!(path = %path.display(), "staging file removed"),
                Err(err) => {
                    tracing::warn!(path = %path.display(), error = %err, "unable to remove staging file");
                }
            }
        }
    }
}
