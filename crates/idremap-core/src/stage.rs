//! Staging of rewritten content
//!
//! Runs the line rewriter for both targets, writing each result to the
//! target's staging sibling. Nothing here touches a live file: promotion
//! is a separate phase that only starts once both targets have staged
//! successfully. A failed or not-found target leaves its staging file in
//! place for the cleanup guard.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};

use crate::error::{EntityKind, RemapError};
use crate::request::{EntityName, UpdateRequest};
use crate::rewrite::{rewrite, LinePattern, RewriteOutcome};
use crate::target::{FileSet, TargetFile};

/// Stage both targets of a run
///
/// The accounts file is rewritten with the user's new (uid, gid) pair,
/// the groups file with the group's new gid. Order does not affect
/// correctness; both must succeed before any commit.
///
/// # Errors
/// `EntityNotFound` if either entity has no record in its file, `Io` if
/// either file cannot be opened, read, or written.
pub fn stage(request: &UpdateRequest, files: &FileSet) -> Result<(), RemapError> {
    let accounts = LinePattern::account(request.user(), request.uid(), request.gid())?;
    stage_one(files.accounts(), &accounts, EntityKind::User, request.user())?;

    let groups = LinePattern::group(request.group(), request.gid())?;
    stage_one(files.groups(), &groups, EntityKind::Group, request.group())?;

    Ok(())
}

fn stage_one(
    target: &TargetFile,
    pattern: &LinePattern,
    kind: EntityKind,
    name: &EntityName,
) -> Result<RewriteOutcome, RemapError> {
    let source = File::open(target.path()).map_err(|e| RemapError::io(target.path(), e))?;
    let staging =
        File::create(target.staging_path()).map_err(|e| RemapError::io(target.staging_path(), e))?;

    let mut writer = BufWriter::new(staging);
    let outcome = rewrite(BufReader::new(source), &mut writer, pattern)
        .map_err(|e| RemapError::io(target.path(), e))?;
    writer
        .flush()
        .map_err(|e| RemapError::io(target.staging_path(), e))?;

    if outcome.lines_changed > 0 {
        tracing::info!(path = %target.path().display(), "update to apply");
    }

    if !outcome.entity_found {
        return Err(RemapError::EntityNotFound {
            kind,
            name: name.as_str().to_string(),
            path: target.path().to_path_buf(),
        });
    }

    Ok(outcome)
}
