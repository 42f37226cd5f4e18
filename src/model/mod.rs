//! Data model: identifiers, release records, and duplicate groups.

pub mod release;
pub mod types;

pub use release::{DuplicateGroup, RELEASE_TAG_KEY, Release, ReleaseFile, TagValue};
pub use types::{ErrorKind, OrgId, ProjectSlug, ReleaseId, ValidationError, Version};
