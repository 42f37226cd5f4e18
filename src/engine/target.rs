//! Merge-target selection.
//!
//! Artifact precedence decides which member of a duplicate group survives
//! a merge: build artifacts are the strongest evidence of "the real"
//! release, and merging would silently discard a project's binaries if
//! two members carried them. Selection runs once per group, before any
//! shape-based rule is consulted.

use std::collections::BTreeSet;

use crate::model::{DuplicateGroup, ReleaseId};

// ---------------------------------------------------------------------------
// TargetChoice
// ---------------------------------------------------------------------------

/// Outcome of merge-target selection for one duplicate group.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TargetChoice {
    /// More than one member carries artifacts; no merge is safe and every
    /// member must be renamed, regardless of shape or timing.
    Ambiguous,
    /// A usable merge target exists.
    Selected {
        /// The release kept if the group merges.
        target: ReleaseId,
        /// The members absorbed into the target, in creation order.
        sources: Vec<ReleaseId>,
    },
}

/// Choose the merge target for `group`.
///
/// - more than one artifact carrier → [`TargetChoice::Ambiguous`];
/// - exactly one carrier → that release;
/// - no carriers → the earliest-created member (`releases[0]`, since
///   groups sort members on construction).
#[must_use]
pub fn select_merge_target(
    group: &DuplicateGroup,
    carriers: &BTreeSet<ReleaseId>,
) -> TargetChoice {
    let target = match carriers.len() {
        0 => match group.releases.first() {
            Some(earliest) => earliest.id,
            None => return TargetChoice::Ambiguous, // empty groups never occur
        },
        1 => match carriers.iter().next() {
            Some(only) => *only,
            None => return TargetChoice::Ambiguous,
        },
        _ => return TargetChoice::Ambiguous,
    };

    let sources = group
        .releases
        .iter()
        .map(|r| r.id)
        .filter(|id| *id != target)
        .collect();

    TargetChoice::Selected { target, sources }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
