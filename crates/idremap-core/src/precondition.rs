//! Privilege and environment gate
//!
//! The tool edits `/etc/passwd` and `/etc/group` in place, so it refuses
//! to run unless it is the superuser AND inside a container, the latter
//! detected by a container-style path in the process control-group
//! descriptor. Both checks run before any target file is opened.
//!
//! The probes sit behind the [`Environment`] trait so tests can substitute
//! their own values without real privileges.

use std::fs;
use std::io;
use std::path::PathBuf;

use once_cell::sync::Lazy;
use regex::Regex;

/// Control-group descriptor of the current process
pub const CONTROL_GROUP_PATH: &str = "/proc/self/cgroup";

static CONTAINER_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new("[0-9]+:[a-z_]*:/docker/[0-9a-f]*").expect("container pattern is valid"));

/// Probes for the process environment
///
/// Implement over mock values in tests; [`HostEnvironment`] provides the
/// real system calls.
pub trait Environment {
    /// Effective user id of the current process
    fn effective_uid(&self) -> u32;

    /// Contents of the process control-group descriptor
    ///
    /// # Errors
    /// Returns the underlying I/O error if the descriptor is unreadable.
    fn control_group_data(&self) -> io::Result<String>;
}

/// The real process environment
#[derive(Debug, Clone, Copy, Default)]
pub struct HostEnvironment;

impl Environment for HostEnvironment {
    fn effective_uid(&self) -> u32 {
        nix::unistd::geteuid().as_raw()
    }

    fn control_group_data(&self) -> io::Result<String> {
        fs::read_to_string(CONTROL_GROUP_PATH)
    }
}

/// Why the environment gate refused to proceed
#[derive(Debug, thiserror::Error)]
pub enum PreconditionError {
    /// Effective uid is not 0
    #[error("must be executed as the superuser")]
    NotSuperuser,

    /// The control-group descriptor could not be read
    #[error("unable to read {}: {source}", path.display())]
    ControlGroupUnreadable {
        /// The descriptor path
        path: PathBuf,
        /// Underlying I/O failure
        source: io::Error,
    },

    /// The control-group descriptor shows no container-style path
    #[error("must be executed inside a container")]
    NotContainerized,
}

/// Check that the environment permits a run
///
/// # Errors
/// Returns the first failing check as a [`PreconditionError`].
pub fn ensure_permitted(env: &impl Environment) -> Result<(), PreconditionError> {
    if env.effective_uid() != 0 {
        return Err(PreconditionError::NotSuperuser);
    }

    let data = env
        .control_group_data()
        .map_err(|source| PreconditionError::ControlGroupUnreadable {
            path: PathBuf::from(CONTROL_GROUP_PATH),
            source,
        })?;

    if !CONTAINER_PATTERN.is_match(&data) {
        return Err(PreconditionError::NotContainerized);
    }

    Ok(())
}
