//! Shared fixtures for the integration tests: release builders, seeded
//! stores, and a store wrapper whose merge primitive fails on demand.

#![allow(dead_code, clippy::unwrap_used)]

use std::collections::BTreeSet;

use chrono::{DateTime, TimeZone, Utc};

use release_dedup::model::{
    DuplicateGroup, OrgId, ProjectSlug, Release, ReleaseFile, ReleaseId, TagValue, Version,
};
use release_dedup::store::{MemoryStore, ReleaseStore, StoreError};

pub fn ts(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(secs, 0).unwrap()
}

pub fn slug(s: &str) -> ProjectSlug {
    ProjectSlug::new(s).unwrap()
}

pub fn version(s: &str) -> Version {
    Version::new(s).unwrap()
}

// ---------------------------------------------------------------------------
// ReleaseBuilder
// ---------------------------------------------------------------------------

/// Fluent builder for release rows.
pub struct ReleaseBuilder {
    release: Release,
}

impl ReleaseBuilder {
    pub fn new(id: u64, org: u64, v: &str) -> Self {
        Self {
            release: Release::new(
                ReleaseId::new(id),
                OrgId::new(org),
                version(v),
                ts(0),
                vec![],
            ),
        }
    }

    pub fn created(mut self, secs: i64) -> Self {
        self.release.date_added = ts(secs);
        self
    }

    pub fn projects(mut self, slugs: &[&str]) -> Self {
        self.release.projects = slugs.iter().map(|s| slug(s)).collect();
        self.release.normalize();
        self
    }

    pub fn vcs_ref(mut self, r: &str) -> Self {
        self.release.vcs_ref = Some(r.to_owned());
        self
    }

    pub fn url(mut self, u: &str) -> Self {
        self.release.url = Some(u.to_owned());
        self
    }

    pub fn build(self) -> Release {
        self.release
    }
}

pub fn release(id: u64, org: u64, v: &str) -> ReleaseBuilder {
    ReleaseBuilder::new(id, org, v)
}

// ---------------------------------------------------------------------------
// Store helpers
// ---------------------------------------------------------------------------

/// Build a store from release rows.
pub fn store_with(releases: Vec<Release>) -> MemoryStore {
    let mut store = MemoryStore::new();
    for r in releases {
        store.insert_release(r);
    }
    store
}

/// Attach an artifact to a release.
pub fn attach_file(store: &mut MemoryStore, release: u64, name: &str) {
    store.insert_file(ReleaseFile {
        release: ReleaseId::new(release),
        name: name.to_owned(),
    });
}

/// Insert a release tag row.
pub fn attach_tag(store: &mut MemoryStore, project: &str, value: &str) {
    store.insert_tag(TagValue {
        project: slug(project),
        key: "release".to_owned(),
        value: value.to_owned(),
    });
}

// ---------------------------------------------------------------------------
// FailingMergeStore
// ---------------------------------------------------------------------------

/// Delegating store whose merge primitive fails for one chosen target,
/// simulating a referential-integrity violation in the datastore.
pub struct FailingMergeStore {
    pub inner: MemoryStore,
    pub fail_target: ReleaseId,
}

impl FailingMergeStore {
    pub fn new(inner: MemoryStore, fail_target: u64) -> Self {
        Self {
            inner,
            fail_target: ReleaseId::new(fail_target),
        }
    }
}

impl ReleaseStore for FailingMergeStore {
    fn duplicate_groups(&self) -> Result<Vec<DuplicateGroup>, StoreError> {
        self.inner.duplicate_groups()
    }

    fn releases_with_artifacts(
        &self,
        group: &DuplicateGroup,
    ) -> Result<BTreeSet<ReleaseId>, StoreError> {
        self.inner.releases_with_artifacts(group)
    }

    fn update_version(&mut self, id: ReleaseId, v: &Version) -> Result<(), StoreError> {
        self.inner.update_version(id, v)
    }

    fn rewrite_tags(
        &mut self,
        projects: &[ProjectSlug],
        old: &Version,
        new: &Version,
    ) -> Result<u64, StoreError> {
        self.inner.rewrite_tags(projects, old, new)
    }

    fn delete_release(&mut self, id: ReleaseId) -> Result<(), StoreError> {
        self.inner.delete_release(id)
    }

    fn merge_releases(
        &mut self,
        target: ReleaseId,
        sources: &[ReleaseId],
    ) -> Result<(), StoreError> {
        if target == self.fail_target {
            return Err(StoreError::MergeFailed {
                target,
                detail: "simulated referential-integrity violation".to_owned(),
            });
        }
        self.inner.merge_releases(target, sources)
    }
}
