//! Integration tests for the deduplication engine, exercised through the
//! public store trait exactly as the CLI drives it.
//!
//! Coverage:
//! - full-SHA duplicates merge unconditionally
//! - environment-split duplicates merge within the seven-day window
//! - semver duplicates rename apart after thirty minutes
//! - orphan releases are deleted, not renamed
//! - dry runs report without mutating; a follow-up live run applies
//! - two artifact carriers force a rename regardless of shape
//! - shared refs anchor semver merges
//! - rename truncation caps versions at 64 characters (tags included)
//! - a clean dataset is a no-op
//! - a failed merge aborts the run, earlier groups intact, later untouched

#![allow(clippy::unwrap_used)]

mod common;

use common::{
    FailingMergeStore, attach_file, attach_tag, release, slug, store_with, version,
};
use release_dedup::config::DedupConfig;
use release_dedup::engine::{self, Action};
use release_dedup::error::DedupError;
use release_dedup::model::{ReleaseId, Version};
use release_dedup::store::{MemoryStore, ReleaseStore, StoreError};

const FULL_SHA: &str = "a1b2c3d4e5f6a7b8c9d0e1f2a3b4c5d6e7f8a9b0";

fn run_live(store: &mut MemoryStore) -> engine::RunReport {
    engine::run_collect(store, &DedupConfig::default(), false).unwrap()
}

fn run_dry(store: &mut MemoryStore) -> engine::RunReport {
    engine::run_collect(store, &DedupConfig::default(), true).unwrap()
}

// ==========================================================================
// Scenario A: full-SHA duplicates merge
// ==========================================================================

#[test]
fn full_sha_duplicates_merge_into_earliest() {
    let mut store = store_with(vec![
        release(1, 1, FULL_SHA).created(0).projects(&["web"]).build(),
        release(2, 1, FULL_SHA)
            .created(60)
            .projects(&["api"])
            .build(),
    ]);

    let report = run_live(&mut store);

    assert_eq!(report.rows.len(), 2);
    assert!(report.rows.iter().all(|r| r.action == Action::Merge));
    assert!(
        report
            .rows
            .iter()
            .all(|r| r.version == version(FULL_SHA))
    );
    assert_eq!(report.merged, 1);

    // Earliest member survives with the union of project associations.
    assert!(store.release(ReleaseId::new(2)).is_none());
    let survivor = store.release(ReleaseId::new(1)).unwrap();
    assert_eq!(survivor.version, version(FULL_SHA));
    assert_eq!(survivor.projects, vec![slug("api"), slug("web")]);
}

// ==========================================================================
// Scenario B: environment split within the seven-day window merges
// ==========================================================================

#[test]
fn environment_split_duplicates_merge_within_window() {
    let mut store = store_with(vec![
        release(10, 2, "release-2016-01-01")
            .created(0)
            .projects(&["app-prod"])
            .build(),
        release(11, 2, "release-2016-01-01")
            .created(259_200) // three days
            .projects(&["app-dev"])
            .build(),
    ]);

    let report = run_live(&mut store);

    assert_eq!(report.rows.len(), 2);
    assert!(report.rows.iter().all(|r| r.action == Action::Merge));
    assert_eq!(store.releases().count(), 1);
}

// ==========================================================================
// Scenario C: semver without anchors renames after thirty minutes
// ==========================================================================

#[test]
fn semver_duplicates_two_hours_apart_rename() {
    let mut store = store_with(vec![
        release(20, 3, "1.2.3").created(0).projects(&["web"]).build(),
        release(21, 3, "1.2.3")
            .created(7_200)
            .projects(&["web"])
            .build(),
    ]);
    attach_tag(&mut store, "web", "1.2.3");

    let report = run_live(&mut store);

    assert_eq!(report.rows.len(), 2);
    assert!(
        report
            .rows
            .iter()
            .all(|r| r.action == Action::UpdatedVersion)
    );
    assert!(
        report
            .rows
            .iter()
            .all(|r| r.version == version("web-1.2.3"))
    );
    assert_eq!(report.renamed, 2);

    for id in [20, 21] {
        assert_eq!(
            store.release(ReleaseId::new(id)).unwrap().version,
            version("web-1.2.3")
        );
    }
    assert_eq!(store.tags()[0].value, "web-1.2.3");
}

// ==========================================================================
// Scenario D: orphans are deleted, not renamed
// ==========================================================================

#[test]
fn orphan_release_in_rename_branch_is_deleted() {
    let mut store = store_with(vec![
        release(30, 4, "weird").created(0).projects(&["api"]).build(),
        release(31, 4, "weird").created(60).build(), // no projects
    ]);

    let report = run_live(&mut store);

    let deleted_row = report
        .rows
        .iter()
        .find(|r| r.release == ReleaseId::new(31))
        .unwrap();
    assert_eq!(deleted_row.action, Action::ReleaseDeleted);
    assert_eq!(deleted_row.version, version("weird"));
    assert_eq!(report.deleted, 1);

    assert!(store.release(ReleaseId::new(31)).is_none());
    assert_eq!(
        store.release(ReleaseId::new(30)).unwrap().version,
        version("api-weird")
    );
}

// ==========================================================================
// Scenario E: dry run reports without mutating
// ==========================================================================

#[test]
fn dry_run_reports_pre_mutation_versions_and_leaves_store_untouched() {
    let mut store = store_with(vec![
        release(20, 3, "1.2.3").created(0).projects(&["web"]).build(),
        release(21, 3, "1.2.3")
            .created(7_200)
            .projects(&["web"])
            .build(),
    ]);
    attach_tag(&mut store, "web", "1.2.3");

    let report = run_dry(&mut store);

    assert_eq!(report.rows.len(), 2);
    assert!(
        report
            .rows
            .iter()
            .all(|r| r.action == Action::UpdatedVersion)
    );
    // Dry-run rename rows carry the pre-mutation version.
    assert!(report.rows.iter().all(|r| r.version == version("1.2.3")));

    // Nothing moved: same duplicates, same tag values.
    assert_eq!(store.duplicate_groups().unwrap().len(), 1);
    assert_eq!(store.tags()[0].value, "1.2.3");

    // A follow-up live run applies the previewed outcome.
    let live = run_live(&mut store);
    assert_eq!(live.renamed, 2);
    assert_eq!(
        store.release(ReleaseId::new(20)).unwrap().version,
        version("web-1.2.3")
    );
}

#[test]
fn dry_run_merge_rows_match_live_merge_rows() {
    let seed = || {
        store_with(vec![
            release(1, 1, FULL_SHA).created(0).build(),
            release(2, 1, FULL_SHA).created(60).build(),
        ])
    };

    let mut dry_store = seed();
    let dry = run_dry(&mut dry_store);
    assert_eq!(dry_store.releases().count(), 2); // unmutated

    let mut live_store = seed();
    let live = run_live(&mut live_store);

    assert_eq!(dry.rows, live.rows);
}

// ==========================================================================
// Artifact precedence
// ==========================================================================

#[test]
fn two_artifact_carriers_force_rename_even_for_full_sha() {
    let mut store = store_with(vec![
        release(40, 5, FULL_SHA).created(0).projects(&["web"]).build(),
        release(41, 5, FULL_SHA)
            .created(60)
            .projects(&["api"])
            .build(),
    ]);
    attach_file(&mut store, 40, "bundle.js.map");
    attach_file(&mut store, 41, "bundle.js.map");

    let report = run_live(&mut store);

    assert!(
        report
            .rows
            .iter()
            .all(|r| r.action == Action::UpdatedVersion)
    );
    assert_eq!(store.releases().count(), 2);
    assert!(store.release(ReleaseId::new(40)).is_some());
    assert!(store.release(ReleaseId::new(41)).is_some());
}

#[test]
fn single_artifact_carrier_becomes_merge_target() {
    let mut store = store_with(vec![
        release(50, 6, FULL_SHA).created(0).build(),
        release(51, 6, FULL_SHA).created(60).projects(&["web"]).build(),
    ]);
    // The later release carries the artifact and wins over the earlier one.
    attach_file(&mut store, 51, "bundle.js.map");

    run_live(&mut store);

    assert!(store.release(ReleaseId::new(50)).is_none());
    assert!(store.release(ReleaseId::new(51)).is_some());
}

// ==========================================================================
// Shared-ref anchoring
// ==========================================================================

#[test]
fn semver_with_shared_ref_merges_despite_spread() {
    let mut store = store_with(vec![
        release(60, 7, "2.0.1")
            .created(0)
            .projects(&["web"])
            .vcs_ref("deadbeefcafe")
            .build(),
        release(61, 7, "2.0.1")
            .created(30 * 86_400)
            .projects(&["web"])
            .vcs_ref("deadbeefcafe")
            .build(),
    ]);

    let report = run_live(&mut store);

    assert!(report.rows.iter().all(|r| r.action == Action::Merge));
    assert_eq!(store.releases().count(), 1);
}

#[test]
fn semver_with_differing_refs_does_not_anchor() {
    let mut store = store_with(vec![
        release(70, 8, "2.0.1")
            .created(0)
            .projects(&["web"])
            .vcs_ref("aaaa")
            .build(),
        release(71, 8, "2.0.1")
            .created(7_200)
            .projects(&["web"])
            .vcs_ref("bbbb")
            .build(),
    ]);

    let report = run_live(&mut store);
    assert!(
        report
            .rows
            .iter()
            .all(|r| r.action == Action::UpdatedVersion)
    );
}

// ==========================================================================
// Rename truncation
// ==========================================================================

#[test]
fn renamed_version_truncates_to_64_chars_and_tags_match() {
    let long_slug = "p".repeat(62);
    let mut store = store_with(vec![
        release(80, 9, "x!").created(0).projects(&[&long_slug]).build(),
        release(81, 9, "x!")
            .created(60)
            .projects(&[&long_slug])
            .build(),
    ]);
    attach_file(&mut store, 80, "a.map");
    attach_file(&mut store, 81, "b.map"); // force the rename branch
    attach_tag(&mut store, &long_slug, "x!");

    run_live(&mut store);

    let renamed = store.release(ReleaseId::new(80)).unwrap();
    assert_eq!(renamed.version.as_str().chars().count(), Version::MAX_LEN);
    assert!(renamed.version.as_str().ends_with("-x"));

    // The tag rewrite used the same truncated value.
    assert_eq!(store.tags()[0].value, renamed.version.as_str());
}

// ==========================================================================
// Idempotence
// ==========================================================================

#[test]
fn clean_dataset_is_a_no_op() {
    let mut store = store_with(vec![
        release(90, 10, "1.0.0").created(0).projects(&["web"]).build(),
        release(91, 10, "2.0.0").created(60).projects(&["web"]).build(),
        release(92, 11, "1.0.0").created(0).projects(&["api"]).build(),
    ]);

    let report = run_live(&mut store);

    assert_eq!(report.scanned, 0);
    assert!(report.rows.is_empty());
    assert_eq!(store.releases().count(), 3);
    assert_eq!(
        store.release(ReleaseId::new(90)).unwrap().version,
        version("1.0.0")
    );
}

#[test]
fn rerun_after_merge_pass_is_a_no_op() {
    let mut store = store_with(vec![
        release(1, 1, FULL_SHA).created(0).build(),
        release(2, 1, FULL_SHA).created(60).build(),
    ]);

    run_live(&mut store);
    let second = run_live(&mut store);

    assert_eq!(second.scanned, 0);
    assert!(second.rows.is_empty());
}

// ==========================================================================
// Merge failure aborts the run
// ==========================================================================

#[test]
fn failed_merge_aborts_keeping_earlier_groups_and_skipping_later_ones() {
    let inner = store_with(vec![
        // Group 1 (org 1): merges cleanly.
        release(1, 1, FULL_SHA).created(0).build(),
        release(2, 1, FULL_SHA).created(60).build(),
        // Group 2 (org 2): the merge primitive blows up here.
        release(3, 2, FULL_SHA).created(0).build(),
        release(4, 2, FULL_SHA).created(60).build(),
        // Group 3 (org 3): never reached.
        release(5, 3, FULL_SHA).created(0).build(),
        release(6, 3, FULL_SHA).created(60).build(),
    ]);

    let mut store = FailingMergeStore::new(inner, 3);
    let mut seen = Vec::new();
    let err = engine::run(&mut store, &DedupConfig::default(), false, |row| {
        seen.push(row.clone());
        Ok(())
    })
    .unwrap_err();

    match err {
        DedupError::Store(StoreError::MergeFailed { target, .. }) => {
            assert_eq!(target, ReleaseId::new(3));
        }
        other => panic!("expected MergeFailed, got {other:?}"),
    }

    // Rows for the first group were already emitted (truncated report).
    assert_eq!(seen.len(), 2);
    assert!(seen.iter().all(|r| r.action == Action::Merge));

    // Group 1 applied, groups 2 and 3 untouched.
    assert!(store.inner.release(ReleaseId::new(2)).is_none());
    assert!(store.inner.release(ReleaseId::new(3)).is_some());
    assert!(store.inner.release(ReleaseId::new(4)).is_some());
    assert!(store.inner.release(ReleaseId::new(5)).is_some());
    assert!(store.inner.release(ReleaseId::new(6)).is_some());
}
