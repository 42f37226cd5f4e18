//! Core identifier and value types for release deduplication.
//!
//! Foundation types used throughout the tool: organization and release
//! identifiers, project slugs, and release version strings. String-backed
//! types validate on construction so that invalid data is rejected at the
//! edge (snapshot load) rather than deep inside the decision engine.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// OrgId
// ---------------------------------------------------------------------------

/// Numeric identifier of an organization in the monitoring datastore.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrgId(u64);

impl OrgId {
    /// Wrap a raw organization id.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Return the raw numeric id.
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for OrgId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

// ---------------------------------------------------------------------------
// ReleaseId
// ---------------------------------------------------------------------------

/// Numeric identifier of a release row in the monitoring datastore.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReleaseId(u64);

impl ReleaseId {
    /// Wrap a raw release id.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Return the raw numeric id.
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ReleaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

// ---------------------------------------------------------------------------
// ProjectSlug
// ---------------------------------------------------------------------------

/// A validated project slug.
///
/// Slugs are lowercase alphanumeric with hyphens and underscores,
/// 1–64 characters. Examples: `frontend`, `app-prod`, `billing_worker`.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ProjectSlug(String);

impl ProjectSlug {
    /// The maximum length of a project slug.
    pub const MAX_LEN: usize = 64;

    /// Create a new `ProjectSlug` from a string, validating format.
    ///
    /// # Errors
    /// Returns an error if the slug is empty, too long, or contains
    /// characters outside `a-z`, `0-9`, `-`, `_`.
    pub fn new(s: &str) -> Result<Self, ValidationError> {
        Self::validate(s)?;
        Ok(Self(s.to_owned()))
    }

    /// Return the slug as a string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn validate(s: &str) -> Result<(), ValidationError> {
        if s.is_empty() {
            return Err(ValidationError {
                kind: ErrorKind::ProjectSlug,
                value: s.to_owned(),
                reason: "project slug must not be empty".to_owned(),
            });
        }
        if s.len() > Self::MAX_LEN {
            return Err(ValidationError {
                kind: ErrorKind::ProjectSlug,
                value: s.to_owned(),
                reason: format!(
                    "project slug must be at most {} characters, got {}",
                    Self::MAX_LEN,
                    s.len()
                ),
            });
        }
        if let Some(bad) = s
            .chars()
            .find(|c| !(c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '-' || *c == '_'))
        {
            return Err(ValidationError {
                kind: ErrorKind::ProjectSlug,
                value: s.to_owned(),
                reason: format!("project slug may only contain a-z, 0-9, '-', '_' (found {bad:?})"),
            });
        }
        Ok(())
    }
}

impl fmt::Display for ProjectSlug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ProjectSlug {
    type Err = ValidationError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for ProjectSlug {
    type Error = ValidationError;
    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::validate(&s)?;
        Ok(Self(s))
    }
}

impl From<ProjectSlug> for String {
    fn from(slug: ProjectSlug) -> Self {
        slug.0
    }
}

// ---------------------------------------------------------------------------
// Version
// ---------------------------------------------------------------------------

/// A validated release version string.
///
/// The datastore column caps versions at 64 characters; any printable
/// string up to that length is accepted (commit SHAs, semver tags, CI
/// build labels, free-form identifiers).
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Version(String);

impl Version {
    /// The maximum length of a version string, in characters.
    pub const MAX_LEN: usize = 64;

    /// Create a new `Version` from a string, validating format.
    ///
    /// # Errors
    /// Returns an error if the string is empty, longer than
    /// [`Version::MAX_LEN`] characters, or contains control characters.
    pub fn new(s: &str) -> Result<Self, ValidationError> {
        Self::validate(s)?;
        Ok(Self(s.to_owned()))
    }

    /// Build the project-qualified replacement version used when renaming
    /// a duplicate: `"<slug>-<original>"`, truncated to
    /// [`Version::MAX_LEN`] characters.
    ///
    /// Truncation operates on characters, never splitting a code point,
    /// so the result is always a valid `Version`.
    #[must_use]
    pub fn qualified(slug: &ProjectSlug, original: &Self) -> Self {
        let qualified = format!("{}-{}", slug.as_str(), original.as_str());
        if qualified.chars().count() <= Self::MAX_LEN {
            Self(qualified)
        } else {
            Self(qualified.chars().take(Self::MAX_LEN).collect())
        }
    }

    /// Return the version as a string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn validate(s: &str) -> Result<(), ValidationError> {
        if s.is_empty() {
            return Err(ValidationError {
                kind: ErrorKind::Version,
                value: s.to_owned(),
                reason: "version must not be empty".to_owned(),
            });
        }
        if s.chars().count() > Self::MAX_LEN {
            return Err(ValidationError {
                kind: ErrorKind::Version,
                value: s.to_owned(),
                reason: format!(
                    "version must be at most {} characters, got {}",
                    Self::MAX_LEN,
                    s.chars().count()
                ),
            });
        }
        if s.chars().any(char::is_control) {
            return Err(ValidationError {
                kind: ErrorKind::Version,
                value: s.to_owned(),
                reason: "version must not contain control characters".to_owned(),
            });
        }
        Ok(())
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Version {
    type Err = ValidationError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for Version {
    type Error = ValidationError;
    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::validate(&s)?;
        Ok(Self(s))
    }
}

impl From<Version> for String {
    fn from(version: Version) -> Self {
        version.0
    }
}

// ---------------------------------------------------------------------------
// ValidationError
// ---------------------------------------------------------------------------

/// Which type failed validation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// A [`ProjectSlug`] failed validation.
    ProjectSlug,
    /// A [`Version`] failed validation.
    Version,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ProjectSlug => write!(f, "project slug"),
            Self::Version => write!(f, "version"),
        }
    }
}

/// A value failed validation during construction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidationError {
    /// Which type rejected the value.
    pub kind: ErrorKind,
    /// The offending value.
    pub value: String,
    /// Why the value is invalid.
    pub reason: String,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid {} '{}': {}", self.kind, self.value, self.reason)
    }
}

impl std::error::Error for ValidationError {}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
