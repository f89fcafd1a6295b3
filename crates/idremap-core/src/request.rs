//! Validated update requests
//!
//! Provides [`EntityName`], [`AccountId`] and the immutable
//! [`UpdateRequest`] built once from the four raw inputs. All shape
//! checks happen here, before any file is touched; the rest of the crate
//! only ever sees already-valid values.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;

static NAME_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new("^[a-z_][a-z0-9_]{0,30}$").expect("name pattern is valid"));

static ID_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new("^[0-9]+$").expect("id pattern is valid"));

/// Name of a user or group record in a flat account file
///
/// Must match `[a-z_][a-z0-9_]{0,30}`: lowercase, underscore, digits
/// after the first character, at most 31 characters total.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EntityName(String);

impl EntityName {
    /// Get the name as a string slice
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for EntityName {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for EntityName {
    type Err = NameRuleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if NAME_PATTERN.is_match(s) {
            Ok(Self(s.to_string()))
        } else {
            Err(NameRuleError(s.to_string()))
        }
    }
}

/// A numeric user or group id
///
/// Non-negative and within the positive signed 32-bit range, matching
/// what the flat account files can carry portably.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AccountId(u32);

impl AccountId {
    /// Largest representable id (positive signed 32-bit range)
    pub const MAX: u32 = i32::MAX as u32;

    /// Get the raw numeric value
    #[inline]
    #[must_use]
    pub const fn value(self) -> u32 {
        self.0
    }
}

impl Display for AccountId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for AccountId {
    type Err = IdRangeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if !ID_PATTERN.is_match(s) {
            return Err(IdRangeError(s.to_string()));
        }
        // All-digit input, so any parse failure is an out-of-range value.
        match s.parse::<i32>() {
            Ok(value) => Ok(Self(value as u32)),
            Err(_) => Err(IdRangeError(s.to_string())),
        }
    }
}

/// Violation of the entity name rule
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("'{0}' must respect [a-z_][a-z0-9_]{{0,30}}")]
pub struct NameRuleError(String);

/// Violation of the id format or range rule
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("'{0}' is an invalid number. Must be between 0 and 2147483647")]
pub struct IdRangeError(String);

/// Errors from building an [`UpdateRequest`]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// User name fails the name rule
    #[error("username: {0}")]
    BadUserName(NameRuleError),

    /// Uid fails the format or range rule
    #[error("uid: {0}")]
    BadUid(IdRangeError),

    /// Group name fails the name rule
    #[error("groupname: {0}")]
    BadGroupName(NameRuleError),

    /// Gid fails the format or range rule
    #[error("gid: {0}")]
    BadGid(IdRangeError),
}

/// The four validated values one run applies
///
/// Immutable once constructed; owned by the run and passed by reference
/// into every component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateRequest {
    user: EntityName,
    uid: AccountId,
    group: EntityName,
    gid: AccountId,
}

impl UpdateRequest {
    /// Validate the four raw inputs and build a request
    ///
    /// # Errors
    /// Returns the first failing field's [`ValidationError`].
    pub fn new(user: &str, uid: &str, group: &str, gid: &str) -> Result<Self, ValidationError> {
        let user = user.parse().map_err(ValidationError::BadUserName)?;
        let uid = uid.parse().map_err(ValidationError::BadUid)?;
        let group = group.parse().map_err(ValidationError::BadGroupName)?;
        let gid = gid.parse().map_err(ValidationError::BadGid)?;
        Ok(Self {
            user,
            uid,
            group,
            gid,
        })
    }

    /// Target user name in the accounts file
    #[inline]
    #[must_use]
    pub fn user(&self) -> &EntityName {
        &self.user
    }

    /// New user id
    #[inline]
    #[must_use]
    pub const fn uid(&self) -> AccountId {
        self.uid
    }

    /// Target group name in the groups file
    #[inline]
    #[must_use]
    pub fn group(&self) -> &EntityName {
        &self.group
    }

    /// New group id
    #[inline]
    #[must_use]
    pub const fn gid(&self) -> AccountId {
        self.gid
    }
}
