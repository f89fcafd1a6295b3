//! Atomic promotion of staged content
//!
//! A commit preserves the live file as the backup generation and then
//! promotes the staged file to the live path. Both steps are
//! same-directory renames, each a single atomic syscall; the live path is
//! only ever missing for the gap between the two renames.
//!
//! Committing the two targets of a run one after the other bounds, but
//! does not eliminate, the cross-file inconsistency window: a crash
//! between the first and second commit leaves one file updated and one
//! not. The backup file, not a journal, is the recovery path.

use std::fs;
use std::io;
use std::path::PathBuf;

use crate::target::TargetFile;

/// Errors during promotion of a staged file
#[derive(Debug, thiserror::Error)]
pub enum CommitError {
    /// The previous backup generation could not be discarded
    #[error("unable to discard previous backup {}: {source}", path.display())]
    DiscardBackup {
        /// The backup path
        path: PathBuf,
        /// Underlying I/O failure
        source: io::Error,
    },

    /// The live file could not be preserved as backup
    #[error("unable to back up {}: {source}", path.display())]
    Backup {
        /// The live path
        path: PathBuf,
        /// Underlying I/O failure
        source: io::Error,
    },

    /// The staged file could not be promoted to the live path
    #[error("unable to promote staged content to {}: {source}", path.display())]
    Promote {
        /// The live path
        path: PathBuf,
        /// Underlying I/O failure
        source: io::Error,
    },
}

/// Promote a target's staged content, preserving the previous generation
///
/// Skipped entirely when the target has no staging file: its existence,
/// checked immediately before commit, is the signal that there is
/// something to apply. A run only keeps the immediately-preceding
/// generation: any older backup is discarded first.
///
/// Returns whether a promotion actually happened.
///
/// # Errors
/// Returns a [`CommitError`] naming the failing step and path.
pub fn commit(target: &TargetFile) -> Result<bool, CommitError> {
    if !target.staging_path().is_file() {
        tracing::debug!(path = %target.path().display(), "nothing staged, commit skipped");
        return Ok(false);
    }

    if target.backup_path().is_file() {
        fs::remove_file(target.backup_path()).map_err(|source| CommitError::DiscardBackup {
            path: target.backup_path().to_path_buf(),
            source,
        })?;
    }

    fs::rename(target.path(), target.backup_path()).map_err(|source| CommitError::Backup {
        path: target.path().to_path_buf(),
        source,
    })?;

    fs::rename(target.staging_path(), target.path()).map_err(|source| CommitError::Promote {
        path: target.path().to_path_buf(),
        source,
    })?;

    tracing::debug!(path = %target.path().display(), "staged content promoted");
    Ok(true)
}
