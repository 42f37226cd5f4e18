//! The merge decision engine.
//!
//! One pass over all duplicate groups: classify the shared version string,
//! select a merge target, consult the rule table, then apply the verdict
//! through the store (or, in a dry run, only report it). Each group is
//! processed to completion before the next; there is no cross-group state
//! beyond the store itself.
//!
//! Audit rows are handed to the caller's sink as soon as each group is
//! applied, so a run aborted by a failed merge still leaves every
//! already-processed group's outcome visible (a truncated report), with
//! the store reflecting exactly those groups.
//!
//! # Invariant
//!
//! After a group is processed, either exactly one release remains under
//! the original version string with all associations pointing at it
//! (merge), or every member has a distinct version string with its tag
//! rows rewritten to match (rename). A failed merge aborts the run,
//! leaving earlier groups' results intact and later groups untouched.

pub mod decide;
pub mod target;
pub mod types;

use tracing::debug;

use crate::classify::classify;
use crate::config::DedupConfig;
use crate::error::DedupError;
use crate::model::{DuplicateGroup, Release, ReleaseId, Version};
use crate::store::ReleaseStore;

pub use decide::{MergePolicy, decide, policy_for};
pub use target::{TargetChoice, select_merge_target};
pub use types::{Action, AuditRow, Decision, GroupSignals, RunReport};

// ---------------------------------------------------------------------------
// run
// ---------------------------------------------------------------------------

/// Run one deduplication pass over every duplicate group in the store.
///
/// `sink` receives each audit row as soon as its group is applied; rows
/// are also collected into the returned [`RunReport`].
///
/// With `dry_run` set, every classification and decision branch executes
/// but no mutation is issued; rename rows then carry the pre-mutation
/// version string (the post-rename string is only knowable after
/// mutation).
///
/// # Errors
/// Propagates the first store or sink failure. Merge-primitive failures
/// are deliberately not retried.
pub fn run<S, F>(
    store: &mut S,
    config: &DedupConfig,
    dry_run: bool,
    mut sink: F,
) -> Result<RunReport, DedupError>
where
    S: ReleaseStore,
    F: FnMut(&AuditRow) -> Result<(), DedupError>,
{
    let groups = store.duplicate_groups()?;
    let mut report = RunReport::default();

    for group in &groups {
        report.scanned += 1;
        process_group(store, config, dry_run, group, &mut report, &mut sink)?;
    }

    Ok(report)
}

/// Convenience wrapper for callers that only want the collected report.
///
/// # Errors
/// Same as [`run`].
pub fn run_collect<S: ReleaseStore>(
    store: &mut S,
    config: &DedupConfig,
    dry_run: bool,
) -> Result<RunReport, DedupError> {
    run(store, config, dry_run, |_| Ok(()))
}

fn process_group<S, F>(
    store: &mut S,
    config: &DedupConfig,
    dry_run: bool,
    group: &DuplicateGroup,
    report: &mut RunReport,
    sink: &mut F,
) -> Result<(), DedupError>
where
    S: ReleaseStore,
    F: FnMut(&AuditRow) -> Result<(), DedupError>,
{
    let shape = classify(group.version.as_str());
    let signals = GroupSignals::compute(group);
    let carriers = store.releases_with_artifacts(group)?;
    let choice = select_merge_target(group, &carriers);

    // Artifact ambiguity forces a rename before any shape rule runs:
    // merging would silently discard one project's binaries.
    let decision = match &choice {
        TargetChoice::Ambiguous => Decision::RenameAll,
        TargetChoice::Selected { .. } => decide(shape, &signals, &config.decision),
    };

    debug!(
        organization = %group.organization,
        version = %group.version,
        %shape,
        ?signals,
        ?decision,
        members = group.len(),
        "adjudicated duplicate group"
    );

    match (decision, choice) {
        (Decision::Merge, TargetChoice::Selected { target, sources }) => {
            apply_merge(store, dry_run, group, target, &sources, report, sink)
        }
        _ => apply_rename_all(store, dry_run, group, report, sink),
    }
}

// ---------------------------------------------------------------------------
// apply
// ---------------------------------------------------------------------------

fn apply_merge<S, F>(
    store: &mut S,
    dry_run: bool,
    group: &DuplicateGroup,
    target: ReleaseId,
    sources: &[ReleaseId],
    report: &mut RunReport,
    sink: &mut F,
) -> Result<(), DedupError>
where
    S: ReleaseStore,
    F: FnMut(&AuditRow) -> Result<(), DedupError>,
{
    if !dry_run {
        store.merge_releases(target, sources)?;
    }

    for release in &group.releases {
        emit(
            report,
            sink,
            audit(release, group.version.clone(), Action::Merge),
        )?;
    }
    report.merged += 1;
    Ok(())
}

fn apply_rename_all<S, F>(
    store: &mut S,
    dry_run: bool,
    group: &DuplicateGroup,
    report: &mut RunReport,
    sink: &mut F,
) -> Result<(), DedupError>
where
    S: ReleaseStore,
    F: FnMut(&AuditRow) -> Result<(), DedupError>,
{
    for release in &group.releases {
        match release.rename_slug() {
            None => {
                // Orphan: nothing references it and no slug can qualify
                // it, so the row is removed instead of renamed.
                if !dry_run {
                    store.delete_release(release.id)?;
                }
                emit(
                    report,
                    sink,
                    audit(release, release.version.clone(), Action::ReleaseDeleted),
                )?;
                report.deleted += 1;
            }
            Some(slug) => {
                let new_version = Version::qualified(slug, &release.version);
                if !dry_run {
                    store.update_version(release.id, &new_version)?;
                    store.rewrite_tags(&release.projects, &release.version, &new_version)?;
                }
                let reported = if dry_run {
                    release.version.clone()
                } else {
                    new_version
                };
                emit(report, sink, audit(release, reported, Action::UpdatedVersion))?;
                report.renamed += 1;
            }
        }
    }
    Ok(())
}

fn audit(release: &Release, version: Version, action: Action) -> AuditRow {
    AuditRow {
        organization: release.organization,
        release: release.id,
        version,
        date_added: release.date_added,
        action,
    }
}

fn emit<F>(report: &mut RunReport, sink: &mut F, row: AuditRow) -> Result<(), DedupError>
where
    F: FnMut(&AuditRow) -> Result<(), DedupError>,
{
    sink(&row)?;
    report.rows.push(row);
    Ok(())
}
