//! The shape → policy rule table.
//!
//! Each version shape maps to a merge policy; the policy plus the group's
//! contextual signals produce the verdict. Keeping the table in one
//! dispatch function (instead of nested branches at the call site) makes
//! every rule's inputs and outputs independently testable.
//!
//! The intuition behind the windows: duplicates created close together
//! are almost certainly the same deploy racing itself, so they merge;
//! duplicates far apart are more likely distinct builds that happen to
//! share a label, so they are renamed apart. How much spread is tolerable
//! depends on how collision-resistant the shape is: a full commit SHA
//! never collides by accident, a semver tag collides all the time.

use crate::classify::VersionShape;
use crate::config::DecisionConfig;

use super::types::{Decision, GroupSignals};

// ---------------------------------------------------------------------------
// MergePolicy
// ---------------------------------------------------------------------------

/// How a duplicate group of a given shape is adjudicated.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MergePolicy {
    /// Merge unconditionally (hash collision across records is assumed to
    /// be the same underlying commit).
    Always,
    /// Merge unless the creation spread exceeds the window; an
    /// environment-split group gets the wider environment window.
    Windowed {
        /// Spread above which members are renamed apart, in seconds.
        rename_after_secs: u64,
    },
    /// Like [`MergePolicy::Windowed`], but a shared non-null ref or URL
    /// across all members proves identity and merges immediately.
    RefAnchored {
        /// Spread above which members are renamed apart, in seconds.
        rename_after_secs: u64,
    },
    /// Rename unconditionally (no evidence justifies an automatic merge).
    Never,
}

/// Map a version shape to its merge policy.
#[must_use]
pub fn policy_for(shape: VersionShape, config: &DecisionConfig) -> MergePolicy {
    match shape {
        VersionShape::FullSha => MergePolicy::Always,
        VersionShape::ShortSha | VersionShape::HeadTag | VersionShape::ShaDate => {
            MergePolicy::Windowed {
                rename_after_secs: config.short_sha_rename_after_secs,
            }
        }
        VersionShape::Semver => MergePolicy::RefAnchored {
            rename_after_secs: config.semver_rename_after_secs,
        },
        VersionShape::CiBuild | VersionShape::WordDate | VersionShape::LongOpaque => {
            MergePolicy::Windowed {
                rename_after_secs: config.opaque_rename_after_secs,
            }
        }
        VersionShape::ShortOpaque => MergePolicy::Never,
    }
}

// ---------------------------------------------------------------------------
// decide
// ---------------------------------------------------------------------------

/// Adjudicate one duplicate group from its shape and signals.
///
/// Artifact ambiguity (more than one member carrying build artifacts)
/// overrides everything and is handled by the caller before this runs.
#[must_use]
pub fn decide(shape: VersionShape, signals: &GroupSignals, config: &DecisionConfig) -> Decision {
    match policy_for(shape, config) {
        MergePolicy::Always => Decision::Merge,
        MergePolicy::Never => Decision::RenameAll,
        MergePolicy::RefAnchored { rename_after_secs } => {
            if signals.shared_vcs_ref || signals.shared_url {
                Decision::Merge
            } else {
                windowed(signals, rename_after_secs, config)
            }
        }
        MergePolicy::Windowed { rename_after_secs } => {
            windowed(signals, rename_after_secs, config)
        }
    }
}

fn windowed(signals: &GroupSignals, rename_after_secs: u64, config: &DecisionConfig) -> Decision {
    if signals.environment_split && signals.date_spread_secs < config.environment_window_secs {
        Decision::Merge
    } else if signals.date_spread_secs > rename_after_secs {
        Decision::RenameAll
    } else {
        Decision::Merge
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
