//! JSON snapshot persistence for [`MemoryStore`].
//!
//! The one-shot CLI operates on an exported snapshot of the release
//! tables rather than a live connection. Loading builds a [`MemoryStore`];
//! saving writes the mutated state back atomically (write-to-temp +
//! fsync + rename), so a crash mid-save never leaves a half-written file.

use std::fmt;
use std::fs;
use std::io::Write as _;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::model::{Release, ReleaseFile, TagValue};

use super::MemoryStore;

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

/// On-disk snapshot of the release tables.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Release rows.
    #[serde(default)]
    pub releases: Vec<Release>,
    /// Artifact associations.
    #[serde(default)]
    pub files: Vec<ReleaseFile>,
    /// Denormalized tag rows.
    #[serde(default)]
    pub tags: Vec<TagValue>,
}

impl From<Snapshot> for MemoryStore {
    fn from(snapshot: Snapshot) -> Self {
        let mut store = Self::new();
        for release in snapshot.releases {
            store.insert_release(release);
        }
        for file in snapshot.files {
            store.insert_file(file);
        }
        for tag in snapshot.tags {
            store.insert_tag(tag);
        }
        store
    }
}

impl From<&MemoryStore> for Snapshot {
    fn from(store: &MemoryStore) -> Self {
        Self {
            releases: store.releases().cloned().collect(),
            files: store.files().to_vec(),
            tags: store.tags().to_vec(),
        }
    }
}

// ---------------------------------------------------------------------------
// load / save
// ---------------------------------------------------------------------------

/// Load a snapshot file into a [`MemoryStore`].
///
/// # Errors
/// Returns [`SnapshotError`] if the file cannot be read or parsed.
pub fn load(path: &Path) -> Result<MemoryStore, SnapshotError> {
    let raw = fs::read_to_string(path).map_err(|e| SnapshotError::Io {
        path: path.to_path_buf(),
        detail: format!("read failed: {e}"),
    })?;

    let snapshot: Snapshot = serde_json::from_str(&raw).map_err(|e| SnapshotError::Parse {
        path: path.to_path_buf(),
        detail: e.to_string(),
    })?;

    Ok(snapshot.into())
}

/// Write the store's current state back to `path`.
///
/// The write is atomic: serialize to a temp file next to the target,
/// fsync, then rename over the original.
///
/// # Errors
/// Returns [`SnapshotError`] on serialization or I/O failure.
pub fn save(store: &MemoryStore, path: &Path) -> Result<(), SnapshotError> {
    let snapshot = Snapshot::from(store);
    let json =
        serde_json::to_string_pretty(&snapshot).map_err(|e| SnapshotError::Parse {
            path: path.to_path_buf(),
            detail: format!("serialize failed: {e}"),
        })?;

    let tmp_path = tmp_sibling(path);

    let io_err = |detail: String| SnapshotError::Io {
        path: path.to_path_buf(),
        detail,
    };

    let mut file =
        fs::File::create(&tmp_path).map_err(|e| io_err(format!("create temp file: {e}")))?;
    file.write_all(json.as_bytes())
        .map_err(|e| io_err(format!("write temp file: {e}")))?;
    file.sync_all()
        .map_err(|e| io_err(format!("fsync temp file: {e}")))?;
    drop(file);

    fs::rename(&tmp_path, path).map_err(|e| io_err(format!("rename into place: {e}")))?;
    Ok(())
}

fn tmp_sibling(path: &Path) -> PathBuf {
    let file_name = path
        .file_name()
        .map_or_else(|| "snapshot".to_owned(), |n| n.to_string_lossy().into_owned());
    path.with_file_name(format!(".{file_name}.tmp"))
}

// ---------------------------------------------------------------------------
// SnapshotError
// ---------------------------------------------------------------------------

/// A snapshot file could not be read, parsed, or written.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SnapshotError {
    /// Filesystem-level failure.
    Io {
        /// The snapshot path.
        path: PathBuf,
        /// What went wrong.
        detail: String,
    },
    /// The file's contents are not a valid snapshot.
    Parse {
        /// The snapshot path.
        path: PathBuf,
        /// What went wrong.
        detail: String,
    },
}

impl fmt::Display for SnapshotError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, detail } => write!(f, "{} ({})", detail, path.display()),
            Self::Parse { path, detail } => {
                write!(f, "invalid snapshot {}: {detail}", path.display())
            }
        }
    }
}

impl std::error::Error for SnapshotError {}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
