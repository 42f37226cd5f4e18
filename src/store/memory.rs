//! In-memory reference implementation of [`ReleaseStore`].
//!
//! Backs the test suite and the snapshot-driven CLI. Rows live in plain
//! collections keyed for deterministic iteration; "atomicity" of the
//! merge primitive is validation-before-mutation — the group is checked
//! in full before any row is touched, so a failed merge leaves the store
//! exactly as it was.

use std::collections::{BTreeMap, BTreeSet};

use crate::model::{
    DuplicateGroup, OrgId, ProjectSlug, RELEASE_TAG_KEY, Release, ReleaseFile, ReleaseId,
    TagValue, Version,
};

use super::{ReleaseStore, StoreError};

// ---------------------------------------------------------------------------
// MemoryStore
// ---------------------------------------------------------------------------

/// An in-memory release datastore.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    releases: BTreeMap<ReleaseId, Release>,
    files: Vec<ReleaseFile>,
    tags: Vec<TagValue>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert (or replace) a release row. The project list is normalized
    /// on the way in so ordering invariants hold regardless of source.
    pub fn insert_release(&mut self, mut release: Release) {
        release.normalize();
        self.releases.insert(release.id, release);
    }

    /// Attach a build artifact to a release.
    pub fn insert_file(&mut self, file: ReleaseFile) {
        self.files.push(file);
    }

    /// Insert a denormalized tag row.
    pub fn insert_tag(&mut self, tag: TagValue) {
        self.tags.push(tag);
    }

    /// Look up a release by id.
    #[must_use]
    pub fn release(&self, id: ReleaseId) -> Option<&Release> {
        self.releases.get(&id)
    }

    /// All release rows, ordered by id.
    pub fn releases(&self) -> impl Iterator<Item = &Release> {
        self.releases.values()
    }

    /// All artifact associations.
    #[must_use]
    pub fn files(&self) -> &[ReleaseFile] {
        &self.files
    }

    /// All tag rows.
    #[must_use]
    pub fn tags(&self) -> &[TagValue] {
        &self.tags
    }

    /// Number of release rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.releases.len()
    }

    /// Whether the store holds no releases.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.releases.is_empty()
    }

    fn get_mut(&mut self, id: ReleaseId) -> Result<&mut Release, StoreError> {
        self.releases
            .get_mut(&id)
            .ok_or(StoreError::ReleaseNotFound { id })
    }
}

// ---------------------------------------------------------------------------
// ReleaseStore impl
// ---------------------------------------------------------------------------

impl ReleaseStore for MemoryStore {
    fn duplicate_groups(&self) -> Result<Vec<DuplicateGroup>, StoreError> {
        let mut by_key: BTreeMap<(OrgId, Version), Vec<Release>> = BTreeMap::new();
        for release in self.releases.values() {
            by_key
                .entry((release.organization, release.version.clone()))
                .or_default()
                .push(release.clone());
        }

        Ok(by_key
            .into_iter()
            .filter(|(_, members)| members.len() > 1)
            .map(|((organization, version), members)| {
                DuplicateGroup::new(organization, version, members)
            })
            .collect())
    }

    fn releases_with_artifacts(
        &self,
        group: &DuplicateGroup,
    ) -> Result<BTreeSet<ReleaseId>, StoreError> {
        let members: BTreeSet<ReleaseId> = group.releases.iter().map(|r| r.id).collect();
        Ok(self
            .files
            .iter()
            .map(|f| f.release)
            .filter(|id| members.contains(id))
            .collect())
    }

    fn update_version(&mut self, id: ReleaseId, version: &Version) -> Result<(), StoreError> {
        self.get_mut(id)?.version = version.clone();
        Ok(())
    }

    fn rewrite_tags(
        &mut self,
        projects: &[ProjectSlug],
        old: &Version,
        new: &Version,
    ) -> Result<u64, StoreError> {
        let mut rewritten = 0;
        for tag in &mut self.tags {
            if tag.key == RELEASE_TAG_KEY
                && tag.value == old.as_str()
                && projects.contains(&tag.project)
            {
                tag.value = new.as_str().to_owned();
                rewritten += 1;
            }
        }
        Ok(rewritten)
    }

    fn delete_release(&mut self, id: ReleaseId) -> Result<(), StoreError> {
        if self.releases.remove(&id).is_none() {
            return Err(StoreError::ReleaseNotFound { id });
        }
        self.files.retain(|f| f.release != id);
        Ok(())
    }

    fn merge_releases(
        &mut self,
        target: ReleaseId,
        sources: &[ReleaseId],
    ) -> Result<(), StoreError> {
        // Validate the whole group before mutating anything.
        if !self.releases.contains_key(&target) {
            return Err(StoreError::ReleaseNotFound { id: target });
        }
        for &source in sources {
            if source == target {
                return Err(StoreError::MergeFailed {
                    target,
                    detail: format!("release {source} is both target and source"),
                });
            }
            if !self.releases.contains_key(&source) {
                return Err(StoreError::ReleaseNotFound { id: source });
            }
        }

        // Reassign artifact associations and fold project sets into the
        // target, then drop the source rows.
        let mut absorbed: Vec<ProjectSlug> = Vec::new();
        for &source in sources {
            for file in &mut self.files {
                if file.release == source {
                    file.release = target;
                }
            }
            if let Some(source_row) = self.releases.remove(&source) {
                absorbed.extend(source_row.projects);
            }
        }

        let target_row = self.get_mut(target)?;
        target_row.projects.extend(absorbed);
        target_row.normalize();
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
