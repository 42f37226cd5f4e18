//! Version-string shape classification.
//!
//! Duplicate handling branches on the *shape* of the shared version string:
//! a full commit SHA is merged unconditionally, a short SHA tolerates hours
//! of spread, a semver tag only minutes. The shape tests here are
//! independent boolean predicates; [`classify`] applies them in one
//! explicit priority order and returns the first match, so every caller
//! sees the same verdict for the same string.
//!
//! # Priority order
//!
//! 1. full SHA (end-anchored)
//! 2. short SHA (end-anchored)
//! 3. head/branch tag
//! 4. short SHA + date
//! 5. semver-like
//! 6. CI build tag (Travis/Jenkins)
//! 7. word + date
//! 8. long opaque (≥ 20 chars), else short opaque
//!
//! The order matters: the predicates are not mutually exclusive (short SHA
//! is a superset of full SHA; the semver test is loose enough to swallow
//! many hyphenated strings with a leading digit group). The semver test is
//! deliberately permissive — tightening it would silently reclassify
//! borderline strings into the rename-only fallback.
//!
//! All patterns except the two SHA tests are anchored at the start only
//! (prefix match, not full match).

use std::sync::LazyLock;

use regex_lite::Regex;

/// Minimum length at which an otherwise-unclassified string counts as a
/// long opaque identifier rather than the short-opaque fallback.
pub const LONG_OPAQUE_MIN_LEN: usize = 20;

static SEMVER_LIKE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-z]*-?v?[0-9]+(\.[0-9]+)*").expect("hard-coded pattern")
});

static HEAD_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(head|master|qa)[-_@(][0-9a-f]{6,40}\)?").expect("hard-coded pattern")
});

static TRAVIS_BUILD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^travis[-_][0-9a-f]{1,40}").expect("hard-coded pattern"));

static JENKINS_BUILD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^jenkins[-_][0-9]{1,40}[-_][0-9a-f]{5,40}").expect("hard-coded pattern")
});

static SHA_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-f0-9]{7,40}-[0-9]{4}-[0-9]{2}-[0-9]{2}").expect("hard-coded pattern")
});

static WORD_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-z]+-[0-9]{4}-[0-9]{2}-[0-9]{2}").expect("hard-coded pattern")
});

// ---------------------------------------------------------------------------
// VersionShape
// ---------------------------------------------------------------------------

/// The shape of a version string, as decided by [`classify`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum VersionShape {
    /// Exactly 40 or 32 lowercase hex characters (git SHA-1 / hg hash).
    FullSha,
    /// 7–40 lowercase hex characters (abbreviated commit hash).
    ShortSha,
    /// `head`/`master`/`qa` followed by a separator and a hex suffix.
    HeadTag,
    /// Short hex hash followed by a `-YYYY-MM-DD` date.
    ShaDate,
    /// Optional word prefix, optional `v`, dot-separated numeric groups.
    Semver,
    /// Travis or Jenkins build tag.
    CiBuild,
    /// Lowercase word followed by a `-YYYY-MM-DD` date.
    WordDate,
    /// Unrecognized but at least [`LONG_OPAQUE_MIN_LEN`] characters.
    LongOpaque,
    /// Unrecognized and short; no evidence to justify a merge.
    ShortOpaque,
}

impl std::fmt::Display for VersionShape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::FullSha => "full-sha",
            Self::ShortSha => "short-sha",
            Self::HeadTag => "head-tag",
            Self::ShaDate => "sha-date",
            Self::Semver => "semver",
            Self::CiBuild => "ci-build",
            Self::WordDate => "word-date",
            Self::LongOpaque => "long-opaque",
            Self::ShortOpaque => "short-opaque",
        };
        f.write_str(label)
    }
}

// ---------------------------------------------------------------------------
// Predicates
// ---------------------------------------------------------------------------

fn is_lower_hex(s: &str) -> bool {
    !s.is_empty()
        && s.chars()
            .all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase())
}

/// Exactly 40 or 32 lowercase hex characters (end-anchored).
#[must_use]
pub fn is_full_sha(version: &str) -> bool {
    (version.len() == 40 || version.len() == 32) && is_lower_hex(version)
}

/// 7–40 lowercase hex characters (end-anchored). Superset of
/// [`is_full_sha`]; [`classify`] tests the full form first.
#[must_use]
pub fn is_short_sha(version: &str) -> bool {
    (7..=40).contains(&version.len()) && is_lower_hex(version)
}

/// `head`/`master`/`qa` + one of `_ - @ (` + 6–40 hex chars, optional `)`.
/// Case-insensitive, prefix-anchored.
#[must_use]
pub fn is_head_tag(version: &str) -> bool {
    HEAD_TAG.is_match(version)
}

/// `<7-40 hex chars>-YYYY-MM-DD` prefix.
#[must_use]
pub fn is_sha_date(version: &str) -> bool {
    SHA_DATE.is_match(version)
}

/// Optional lowercase prefix word, optional leading hyphen, optional `v`,
/// then one or more dot-separated numeric groups. Prefix-anchored and
/// deliberately loose.
#[must_use]
pub fn is_semver_like(version: &str) -> bool {
    SEMVER_LIKE.is_match(version)
}

/// Travis (`travis[-_]<hex>`) or Jenkins (`jenkins[-_]<digits>[-_]<hex>`)
/// build tag. Case-insensitive, prefix-anchored.
#[must_use]
pub fn is_ci_build(version: &str) -> bool {
    TRAVIS_BUILD.is_match(version) || JENKINS_BUILD.is_match(version)
}

/// `<lowercase word>-YYYY-MM-DD` prefix.
#[must_use]
pub fn is_word_date(version: &str) -> bool {
    WORD_DATE.is_match(version)
}

// ---------------------------------------------------------------------------
// classify
// ---------------------------------------------------------------------------

/// Classify a version string into its first matching shape.
///
/// Total: every string maps to a shape (the opaque fallbacks catch
/// everything). Deterministic: same input, same output, no state.
#[must_use]
pub fn classify(version: &str) -> VersionShape {
    if is_full_sha(version) {
        VersionShape::FullSha
    } else if is_short_sha(version) {
        VersionShape::ShortSha
    } else if is_head_tag(version) {
        VersionShape::HeadTag
    } else if is_sha_date(version) {
        VersionShape::ShaDate
    } else if is_semver_like(version) {
        VersionShape::Semver
    } else if is_ci_build(version) {
        VersionShape::CiBuild
    } else if is_word_date(version) {
        VersionShape::WordDate
    } else if version.chars().count() >= LONG_OPAQUE_MIN_LEN {
        VersionShape::LongOpaque
    } else {
        VersionShape::ShortOpaque
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
