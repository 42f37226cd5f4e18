//! Core types flowing through the decision engine.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::model::{DuplicateGroup, OrgId, ReleaseId, Version};

// ---------------------------------------------------------------------------
// Action
// ---------------------------------------------------------------------------

/// What happened (or, in a dry run, would happen) to one release.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// The release was part of a group collapsed into one canonical row.
    Merge,
    /// The release's version was qualified with a project slug.
    UpdatedVersion,
    /// The release had no project associations and was removed.
    ReleaseDeleted,
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Merge => write!(f, "merge"),
            Self::UpdatedVersion => write!(f, "updated_version"),
            Self::ReleaseDeleted => write!(f, "release_deleted"),
        }
    }
}

// ---------------------------------------------------------------------------
// AuditRow
// ---------------------------------------------------------------------------

/// One line of the audit report: a release the run touched and how.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AuditRow {
    /// Owning organization.
    pub organization: OrgId,
    /// The affected release.
    pub release: ReleaseId,
    /// The release's version after the action (pre-mutation in dry runs).
    pub version: Version,
    /// When the release row was created.
    pub date_added: DateTime<Utc>,
    /// The action taken.
    pub action: Action,
}

// ---------------------------------------------------------------------------
// Decision
// ---------------------------------------------------------------------------

/// The engine's verdict for one duplicate group.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Decision {
    /// Collapse the group into its merge target.
    Merge,
    /// Qualify every member's version with a project slug.
    RenameAll,
}

// ---------------------------------------------------------------------------
// GroupSignals
// ---------------------------------------------------------------------------

/// Contextual evidence extracted from a duplicate group, consumed by the
/// rule table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GroupSignals {
    /// The group's distinct project slugs cover at least two of the
    /// production / staging / development environment families.
    pub environment_split: bool,
    /// Spread between the earliest and latest member creation times.
    pub date_spread_secs: u64,
    /// Every member carries the same non-null source-control ref.
    pub shared_vcs_ref: bool,
    /// Every member carries the same non-null source URL.
    pub shared_url: bool,
}

impl GroupSignals {
    /// Extract signals from a group.
    #[must_use]
    pub fn compute(group: &DuplicateGroup) -> Self {
        let slugs: BTreeSet<&str> = group
            .releases
            .iter()
            .flat_map(|r| r.projects.iter().map(crate::model::ProjectSlug::as_str))
            .collect();

        let has_prod = slugs.iter().any(|s| s.contains("prod"));
        let has_staging = slugs.iter().any(|s| s.contains("stag") || s.contains("stg"));
        let has_dev = slugs.iter().any(|s| s.contains("dev"));
        let environment_split =
            usize::from(has_prod) + usize::from(has_staging) + usize::from(has_dev) >= 2;

        // Members are sorted by creation time, so the spread is last - first.
        let date_spread_secs = match (group.releases.first(), group.releases.last()) {
            (Some(first), Some(last)) => u64::try_from(
                last.date_added
                    .signed_duration_since(first.date_added)
                    .num_seconds(),
            )
            .unwrap_or(0),
            _ => 0,
        };

        Self {
            environment_split,
            date_spread_secs,
            shared_vcs_ref: all_share(group, |r| r.vcs_ref.as_deref()),
            shared_url: all_share(group, |r| r.url.as_deref()),
        }
    }
}

/// True when `field` is non-null and identical across every group member.
fn all_share<'a>(
    group: &'a DuplicateGroup,
    field: impl Fn(&'a crate::model::Release) -> Option<&'a str>,
) -> bool {
    let mut values = group.releases.iter().map(field);
    match values.next().flatten() {
        None => false,
        Some(first) => values.all(|v| v == Some(first)),
    }
}

// ---------------------------------------------------------------------------
// RunReport
// ---------------------------------------------------------------------------

/// Summary of one deduplication pass.
#[derive(Clone, Debug, Default)]
pub struct RunReport {
    /// Duplicate groups examined.
    pub scanned: usize,
    /// Groups collapsed by the merge primitive.
    pub merged: usize,
    /// Releases renamed apart.
    pub renamed: usize,
    /// Orphan releases deleted.
    pub deleted: usize,
    /// One row per affected release, in processing order.
    pub rows: Vec<AuditRow>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
