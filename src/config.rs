//! Tool configuration (`--config <file>.toml`).
//!
//! The decision thresholds were tuned against historical data rather than
//! derived from a model, so they are surfaced as configuration instead of
//! burned-in constants. Every field has a default; an absent `[decision]`
//! table or absent fields fall back to the historical values.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Deserialize;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Top-level tool configuration.
///
/// ```toml
/// [decision]
/// short_sha_rename_after_secs = 28800
/// opaque_rename_after_secs = 14400
/// semver_rename_after_secs = 1800
/// environment_window_secs = 604800
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct DedupConfig {
    /// Decision-engine thresholds.
    #[serde(default)]
    pub decision: DecisionConfig,
}

impl DedupConfig {
    /// Load configuration from an optional TOML file.
    ///
    /// `None` yields the defaults. An explicitly given path must exist
    /// and parse; a missing or malformed file is an error (the operator
    /// asked for it, silently ignoring it could change merge behavior).
    ///
    /// # Errors
    /// Returns a [`ConfigError`] if the file cannot be read or parsed.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let raw = std::fs::read_to_string(path).map_err(|e| ConfigError {
            path: Some(path.to_path_buf()),
            message: format!("failed to read config: {e}"),
        })?;

        toml::from_str(&raw).map_err(|e| ConfigError {
            path: Some(path.to_path_buf()),
            message: format!("failed to parse config: {e}"),
        })
    }
}

// ---------------------------------------------------------------------------
// DecisionConfig
// ---------------------------------------------------------------------------

/// Thresholds consumed by the merge decision engine, in seconds.
///
/// A duplicate group whose members span more than the shape's
/// `*_rename_after_secs` window is renamed apart instead of merged,
/// unless the group's projects span distinct deploy environments and the
/// spread stays inside `environment_window_secs`, in which case the
/// duplicates are taken to be multi-project reports of one release.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DecisionConfig {
    /// Rename threshold for short-SHA, head-tag, and SHA+date shapes.
    #[serde(default = "default_short_sha_rename_after_secs")]
    pub short_sha_rename_after_secs: u64,

    /// Rename threshold for CI-build, word+date, and long opaque shapes.
    #[serde(default = "default_opaque_rename_after_secs")]
    pub opaque_rename_after_secs: u64,

    /// Rename threshold for semver-like shapes.
    #[serde(default = "default_semver_rename_after_secs")]
    pub semver_rename_after_secs: u64,

    /// Maximum spread under which environment-split groups still merge.
    #[serde(default = "default_environment_window_secs")]
    pub environment_window_secs: u64,
}

impl Default for DecisionConfig {
    fn default() -> Self {
        Self {
            short_sha_rename_after_secs: default_short_sha_rename_after_secs(),
            opaque_rename_after_secs: default_opaque_rename_after_secs(),
            semver_rename_after_secs: default_semver_rename_after_secs(),
            environment_window_secs: default_environment_window_secs(),
        }
    }
}

const fn default_short_sha_rename_after_secs() -> u64 {
    28_800 // 8 hours
}

const fn default_opaque_rename_after_secs() -> u64 {
    14_400 // 4 hours
}

const fn default_semver_rename_after_secs() -> u64 {
    1_800 // 30 minutes
}

const fn default_environment_window_secs() -> u64 {
    604_800 // 7 days
}

// ---------------------------------------------------------------------------
// ConfigError
// ---------------------------------------------------------------------------

/// A configuration file could not be loaded or parsed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConfigError {
    /// Path to the configuration file, if one was involved.
    pub path: Option<PathBuf>,
    /// Human-readable description of the problem.
    pub message: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.path {
            Some(path) => write!(f, "{} ({})", self.message, path.display()),
            None => f.write_str(&self.message),
        }
    }
}

impl std::error::Error for ConfigError {}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
