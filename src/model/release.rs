//! Release records and the transient duplicate group.
//!
//! A [`Release`] is one row of the monitoring datastore's release table; a
//! [`DuplicateGroup`] is the query-derived set of all releases sharing an
//! organization and version string when that pair's count exceeds one.
//! Groups are never persisted — they are recomputed on every run.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::types::{OrgId, ProjectSlug, ReleaseId, Version};

/// The tag key under which telemetry is indexed by release version.
pub const RELEASE_TAG_KEY: &str = "release";

// ---------------------------------------------------------------------------
// Release
// ---------------------------------------------------------------------------

/// A recorded deployment of a named version of software to one or more
/// projects.
///
/// Identity in the datastore is `(organization, version)`; `id` is the
/// surrogate row id. `projects` is kept sorted and deduplicated so that
/// slug selection during a rename is deterministic regardless of the
/// order associations were reported in.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Release {
    /// Surrogate row id.
    pub id: ReleaseId,
    /// Owning organization.
    pub organization: OrgId,
    /// The reported version string.
    pub version: Version,
    /// When this row was created.
    pub date_added: DateTime<Utc>,
    /// Source-control ref the release was reported against, if any.
    #[serde(rename = "ref", default, skip_serializing_if = "Option::is_none")]
    pub vcs_ref: Option<String>,
    /// Source URL the release was reported against, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Slugs of the projects this release is associated with.
    #[serde(default)]
    pub projects: Vec<ProjectSlug>,
}

impl Release {
    /// Create a release, normalizing the project list (sorted, deduplicated).
    #[must_use]
    pub fn new(
        id: ReleaseId,
        organization: OrgId,
        version: Version,
        date_added: DateTime<Utc>,
        mut projects: Vec<ProjectSlug>,
    ) -> Self {
        projects.sort();
        projects.dedup();
        Self {
            id,
            organization,
            version,
            date_added,
            vcs_ref: None,
            url: None,
            projects,
        }
    }

    /// Sort and deduplicate the project list in place.
    ///
    /// Called by the store on ingest so that releases deserialized from a
    /// snapshot satisfy the same ordering invariant as constructed ones.
    pub fn normalize(&mut self) {
        self.projects.sort();
        self.projects.dedup();
    }

    /// The slug used to qualify this release's version on rename: the
    /// lexicographically smallest associated project. `None` for orphans.
    #[must_use]
    pub fn rename_slug(&self) -> Option<&ProjectSlug> {
        self.projects.first()
    }
}

// ---------------------------------------------------------------------------
// ReleaseFile
// ---------------------------------------------------------------------------

/// Association between a release and an uploaded build artifact.
///
/// Only existence matters to the decision engine: a release carrying at
/// least one artifact is preferred as the merge target, and a group with
/// two or more artifact-carrying releases is never merged.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseFile {
    /// The release the artifact is attached to.
    pub release: ReleaseId,
    /// Artifact file name (informational; content is out of scope).
    pub name: String,
}

// ---------------------------------------------------------------------------
// TagValue
// ---------------------------------------------------------------------------

/// A denormalized secondary index row: `(project, key, value)`.
///
/// Rows with key [`RELEASE_TAG_KEY`] map telemetry back to a release by
/// version string and must be rewritten whenever a release is renamed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagValue {
    /// The project the tag is scoped to.
    pub project: ProjectSlug,
    /// Tag key.
    pub key: String,
    /// Tag value.
    pub value: String,
}

// ---------------------------------------------------------------------------
// DuplicateGroup
// ---------------------------------------------------------------------------

/// All release rows for one `(organization, version)` pair with count > 1.
///
/// Members are sorted by creation time (row id as tie-break) on
/// construction, so "earliest release" is always `releases[0]` and audit
/// output is deterministic.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DuplicateGroup {
    /// The organization all members belong to.
    pub organization: OrgId,
    /// The shared version string.
    pub version: Version,
    /// Member releases, sorted by `(date_added, id)`.
    pub releases: Vec<Release>,
}

impl DuplicateGroup {
    /// Create a group, sorting members by `(date_added, id)`.
    #[must_use]
    pub fn new(organization: OrgId, version: Version, mut releases: Vec<Release>) -> Self {
        releases.sort_by(|a, b| (a.date_added, a.id).cmp(&(b.date_added, b.id)));
        Self {
            organization,
            version,
            releases,
        }
    }

    /// Number of member releases.
    #[must_use]
    pub fn len(&self) -> usize {
        self.releases.len()
    }

    /// Whether the group has no members (never produced by the store).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.releases.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
