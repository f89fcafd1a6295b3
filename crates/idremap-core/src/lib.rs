//! idremap core
//!
//! Atomic dual-file rewrite engine for remapping one account's UID/GID
//! inside a container's flat account files.
//!
//! # Core Concepts
//!
//! - [`UpdateRequest`]: the four validated values one run applies
//! - [`FileSet`] / [`TargetFile`]: live files with sibling staging and
//!   backup paths
//! - [`rewrite`]: line rewriter substituting only the numeric id fields
//! - [`apply`]: stage both targets, then commit both, with staging
//!   leftovers removed on every exit path
//! - [`precondition`]: superuser + containerized gate, checked by the
//!   caller before any file I/O
//!
//! # Example
//!
//! ```rust,ignore
//! use idremap_core::{apply, FileSet, UpdateRequest};
//!
//! let request = UpdateRequest::new("alice", "2000", "staff", "2000")?;
//! apply(&request, &FileSet::system())?;
//! ```

#![warn(unreachable_pub)]

mod cleanup;
mod commit;
mod error;
pub mod precondition;
mod request;
mod rewrite;
mod stage;
mod target;

pub use cleanup::CleanupGuard;
pub use commit::{commit, CommitError};
pub use error::{EntityKind, RemapError};
pub use request::{AccountId, EntityName, IdRangeError, NameRuleError, UpdateRequest, ValidationError};
pub use rewrite::{rewrite, LinePattern, RewriteOutcome};
pub use stage::stage;
pub use target::{FileSet, TargetFile};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Apply a validated request against a file set
///
/// Stages both targets, then promotes both. Promotion only starts once
/// both targets have staged successfully, so a validation or I/O failure
/// never leaves a half-promoted pair. Staging leftovers are removed on
/// every exit path; backups persist as the previous generation.
///
/// # Errors
/// Any staging or commit failure, each terminal for the run.
pub fn apply(request: &UpdateRequest, files: &FileSet) -> Result<(), RemapError> {
    let _guard = CleanupGuard::new(files);

    stage::stage(request, files)?;

    commit::commit(files.accounts())?;
    commit::commit(files.groups())?;

    Ok(())
}
