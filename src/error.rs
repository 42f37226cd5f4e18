//! Unified error type for the deduplication run.
//!
//! Defines [`DedupError`], the error surfaced from the engine and the
//! store layers. Failures abort the run: a failed merge leaves ambiguous
//! partial state, and retrying blindly risks data loss, so the policy is
//! fail-fast with full diagnostic output. The binary prints the error to
//! stderr and exits non-zero; it never reports into the monitoring
//! platform it is repairing.

use std::fmt;
use std::path::PathBuf;

use crate::store::{SnapshotError, StoreError};

// ---------------------------------------------------------------------------
// DedupError
// ---------------------------------------------------------------------------

/// Unified error type for a deduplication run.
#[derive(Debug)]
pub enum DedupError {
    /// A configuration file could not be loaded or parsed.
    Config {
        /// Path to the configuration file, if one was involved.
        path: Option<PathBuf>,
        /// Human-readable description of the problem.
        detail: String,
    },

    /// A snapshot file could not be read, parsed, or written.
    Snapshot(SnapshotError),

    /// A datastore operation failed. Merge-primitive failures land here
    /// and abort the run with already-processed groups left intact.
    Store(StoreError),

    /// Writing the audit report to the output stream failed.
    Report(std::io::Error),
}

impl fmt::Display for DedupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config { path, detail } => match path {
                Some(path) => write!(f, "configuration error in '{}': {detail}", path.display()),
                None => write!(f, "configuration error: {detail}"),
            },
            Self::Snapshot(err) => write!(f, "snapshot error: {err}"),
            Self::Store(err) => write!(f, "datastore error: {err}"),
            Self::Report(err) => write!(f, "failed to write audit report: {err}"),
        }
    }
}

impl std::error::Error for DedupError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Config { .. } => None,
            Self::Snapshot(err) => Some(err),
            Self::Store(err) => Some(err),
            Self::Report(err) => Some(err),
        }
    }
}

// ---------------------------------------------------------------------------
// From impls
// ---------------------------------------------------------------------------

impl From<StoreError> for DedupError {
    fn from(err: StoreError) -> Self {
        Self::Store(err)
    }
}

impl From<SnapshotError> for DedupError {
    fn from(err: SnapshotError) -> Self {
        Self::Snapshot(err)
    }
}

impl From<crate::config::ConfigError> for DedupError {
    fn from(err: crate::config::ConfigError) -> Self {
        Self::Config {
            path: err.path,
            detail: err.message,
        }
    }
}

impl From<std::io::Error> for DedupError {
    fn from(err: std::io::Error) -> Self {
        Self::Report(err)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
