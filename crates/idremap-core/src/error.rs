//! Error taxonomy for a remap run
//!
//! Every error is terminal: the run reports it and stops. There are no
//! retries and no partial continuation; staging artifacts are still
//! removed on the way out by the cleanup guard.

use std::io;
use std::path::{Path, PathBuf};

use crate::commit::CommitError;
use crate::precondition::PreconditionError;
use crate::request::ValidationError;

/// Main error type for a remap run
#[derive(Debug, thiserror::Error)]
pub enum RemapError {
    /// Environment gate failed before any file was touched
    #[error("precondition failed: {0}")]
    Precondition(#[from] PreconditionError),

    /// An input failed its shape check
    #[error("invalid input: {0}")]
    Validation(#[from] ValidationError),

    /// A source or staging file could not be read or written
    #[error("unable to access {}: {source}", path.display())]
    Io {
        /// The file being accessed
        path: PathBuf,
        /// Underlying I/O failure
        source: io::Error,
    },

    /// The target entity has no record in its file
    #[error("{kind} '{name}' not found in {}", path.display())]
    EntityNotFound {
        /// Which file kind was searched
        kind: EntityKind,
        /// The entity name searched for
        name: String,
        /// The file searched
        path: PathBuf,
    },

    /// Promotion of staged content failed
    #[error("commit failed: {0}")]
    Commit(#[from] CommitError),

    /// An entity line pattern failed to compile
    #[error("invalid line pattern: {0}")]
    Pattern(#[from] regex::Error),
}

impl RemapError {
    /// Wrap an I/O error with the path it occurred on
    #[inline]
    pub(crate) fn io(path: &Path, source: io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// The two record kinds a run touches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    /// A record in the accounts file
    User,
    /// A record in the groups file
    Group,
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::User => f.write_str("user"),
            Self::Group => f.write_str("group"),
        }
    }
}
