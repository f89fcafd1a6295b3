//! Target file triples
//!
//! A [`TargetFile`] groups a live file path with its staging and backup
//! siblings. Keeping all three in the same directory keeps every rename
//! within one filesystem, so promotion stays a single atomic syscall.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Suffix appended to the live file name for staged content
const STAGING_SUFFIX: &str = "tmp";

/// Suffix appended to the live file name for the previous generation
const BACKUP_SUFFIX: &str = "backup";

/// A live file plus its sibling staging and backup paths
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetFile {
    path: PathBuf,
    staging_path: PathBuf,
    backup_path: PathBuf,
}

impl TargetFile {
    /// Create a target for a live file, deriving the sibling paths
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let staging_path = sibling_with_suffix(&path, STAGING_SUFFIX);
        let backup_path = sibling_with_suffix(&path, BACKUP_SUFFIX);
        Self {
            path,
            staging_path,
            backup_path,
        }
    }

    /// The live file path
    #[inline]
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Where staged content is written before promotion
    #[inline]
    #[must_use]
    pub fn staging_path(&self) -> &Path {
        &self.staging_path
    }

    /// Where the previous generation is preserved after promotion
    #[inline]
    #[must_use]
    pub fn backup_path(&self) -> &Path {
        &self.backup_path
    }
}

/// Same directory, same base name, extra dot-suffix.
fn sibling_with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path
        .file_name()
        .map(OsString::from)
        .unwrap_or_else(OsString::new);
    name.push(".");
    name.push(suffix);
    path.with_file_name(name)
}

/// The accounts and groups targets for one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSet {
    accounts: TargetFile,
    groups: TargetFile,
}

impl FileSet {
    /// Live accounts file on a standard system
    pub const ACCOUNTS_PATH: &'static str = "/etc/passwd";

    /// Live groups file on a standard system
    pub const GROUPS_PATH: &'static str = "/etc/group";

    /// The standard `/etc` layout
    #[must_use]
    pub fn system() -> Self {
        Self {
            accounts: TargetFile::new(Self::ACCOUNTS_PATH),
            groups: TargetFile::new(Self::GROUPS_PATH),
        }
    }

    /// A `passwd`/`group` pair under an arbitrary directory
    ///
    /// Used by tests to run against a scratch directory instead of `/etc`.
    #[must_use]
    pub fn rooted(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            accounts: TargetFile::new(dir.join("passwd")),
            groups: TargetFile::new(dir.join("group")),
        }
    }

    /// The accounts target
    #[inline]
    #[must_use]
    pub fn accounts(&self) -> &TargetFile {
        &self.accounts
    }

    /// The groups target
    #[inline]
    #[must_use]
    pub fn groups(&self) -> &TargetFile {
        &self.groups
    }
}
