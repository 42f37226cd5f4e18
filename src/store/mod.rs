//! Datastore interface for release deduplication.
//!
//! Defines [`ReleaseStore`], the contract between the decision engine and
//! the backing datastore. The engine needs exactly six operations: group
//! enumeration, artifact lookup, version update, tag rewrite, deletion,
//! and the atomic merge primitive. Everything else about the datastore
//! (schema, transactions, ingestion) stays behind this seam.
//!
//! [`MemoryStore`] is the reference implementation over plain collections;
//! the [`snapshot`] module loads and persists one as a JSON file for the
//! one-shot CLI.

pub mod memory;
pub mod snapshot;

use std::collections::BTreeSet;
use std::fmt;

use crate::model::{DuplicateGroup, ProjectSlug, ReleaseId, Version};

pub use memory::MemoryStore;
pub use snapshot::{Snapshot, SnapshotError};

// ---------------------------------------------------------------------------
// ReleaseStore
// ---------------------------------------------------------------------------

/// The datastore operations the decision engine consumes.
///
/// # Key invariants
///
/// - **Group enumeration**: only `(organization, version)` pairs with more
///   than one release are returned; members arrive sorted by creation
///   time. A clean datastore yields an empty list, making a re-run a
///   no-op.
/// - **Merge atomicity**: [`ReleaseStore::merge_releases`] either fully
///   reassigns all source-side associations to the target and removes the
///   sources, or fails leaving the group untouched. Failures are
///   propagated, never retried.
#[allow(clippy::missing_errors_doc)]
pub trait ReleaseStore {
    /// Enumerate all duplicate groups, ordered by `(organization, version)`.
    fn duplicate_groups(&self) -> Result<Vec<DuplicateGroup>, StoreError>;

    /// The distinct releases in `group` carrying at least one build
    /// artifact.
    fn releases_with_artifacts(
        &self,
        group: &DuplicateGroup,
    ) -> Result<BTreeSet<ReleaseId>, StoreError>;

    /// Update one release's version string.
    fn update_version(&mut self, id: ReleaseId, version: &Version) -> Result<(), StoreError>;

    /// Rewrite denormalized release tags: every tag row scoped to one of
    /// `projects`, keyed by the release tag key, and holding `old` is
    /// updated to `new`. Returns the number of rows rewritten.
    fn rewrite_tags(
        &mut self,
        projects: &[ProjectSlug],
        old: &Version,
        new: &Version,
    ) -> Result<u64, StoreError>;

    /// Delete one release row (orphan cleanup).
    fn delete_release(&mut self, id: ReleaseId) -> Result<(), StoreError>;

    /// The atomic merge primitive: reassign all of `sources`' associations
    /// to `target` and remove the source rows.
    fn merge_releases(
        &mut self,
        target: ReleaseId,
        sources: &[ReleaseId],
    ) -> Result<(), StoreError>;
}

// ---------------------------------------------------------------------------
// StoreError
// ---------------------------------------------------------------------------

/// A datastore operation failed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StoreError {
    /// The referenced release row does not exist.
    ReleaseNotFound {
        /// The missing release id.
        id: ReleaseId,
    },

    /// The merge primitive failed; the group was left untouched.
    MergeFailed {
        /// The intended merge target.
        target: ReleaseId,
        /// What went wrong.
        detail: String,
    },

    /// The store's contents are inconsistent (e.g. a snapshot referencing
    /// unknown rows).
    Corrupted {
        /// Human-readable description of the inconsistency.
        detail: String,
    },
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ReleaseNotFound { id } => write!(f, "release {id} not found"),
            Self::MergeFailed { target, detail } => {
                write!(f, "merge into release {target} failed: {detail}")
            }
            Self::Corrupted { detail } => write!(f, "store corrupted: {detail}"),
        }
    }
}

impl std::error::Error for StoreError {}
