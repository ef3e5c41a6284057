//! The Go standard library presented as a single synthetic module.
//!
//! The library's history uses its own release-tag naming (`go1.13beta1`)
//! instead of semantic versions, lives under a directory that moved once
//! in its history, and can also be tracked by a small fixed set of
//! branches.

pub mod tag;

use std::cmp::Ordering;

use crate::core::version::compare;

pub use tag::{major_version_for_version, tag_for_version, version_for_tag};

/// Module path under which the standard library is published.
pub const MODULE_PATH: &str = "std";

/// Upstream repository holding the standard library sources.
pub const GO_REPO_URL: &str = "https://go.googlesource.com/go";

/// The mainline branch.
pub const MASTER_BRANCH: &str = "master";

/// Branches accepted as requested versions in addition to tagged releases.
pub const SUPPORTED_BRANCHES: &[&str] = &[MASTER_BRANCH, "dev.boringcrypto", "dev.fuzz"];

/// Prefix shared by every pseudo-version synthesized for a branch.
pub const BRANCH_PSEUDO_PREFIX: &str = "v0.0.0";

/// First version whose library sources live in `src` instead of `src/pkg`.
const SRC_DIR_SINCE: &str = "v1.4.0-beta.1";

/// First release tagged with an explicit `.0` patch (`go1.21.0`).
pub(crate) const ZERO_PATCH_TAG_SINCE: &str = "v1.21.0";

/// Whether `name` is one of [`SUPPORTED_BRANCHES`].
pub fn is_supported_branch(name: &str) -> bool {
    SUPPORTED_BRANCHES.contains(&name)
}

/// The branch tracked by `version`, if it names one.
///
/// Branch pseudo-versions do not record which branch they came from and
/// are attributed to [`MASTER_BRANCH`].
pub fn branch_for_version(version: &str) -> Option<&str> {
    if is_supported_branch(version) {
        Some(version)
    } else if version.starts_with(BRANCH_PSEUDO_PREFIX) {
        Some(MASTER_BRANCH)
    } else {
        None
    }
}

/// Whether the import path belongs to the standard library.
///
/// Standard library paths have no dot in their first element, unlike
/// paths hosted on a domain.
pub fn contains(path: &str) -> bool {
    let first = path.split('/').next().unwrap_or(path);
    !first.is_empty() && !first.contains('.')
}

/// Directory of the library sources relative to the repository root.
///
/// A branch or branch pseudo-version always tracks the current layout.
pub fn directory(version: &str) -> &'static str {
    if is_supported_branch(version)
        || version.starts_with(BRANCH_PSEUDO_PREFIX)
        || compare(version, SRC_DIR_SINCE) != Ordering::Less
    {
        "src"
    } else {
        "src/pkg"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains() {
        assert!(contains("errors"));
        assert!(contains("net/http"));
        assert!(contains("cmd/go/internal/base"));
        assert!(!contains("github.com/user/repo"));
        assert!(!contains("golang.org/x/tools"));
        assert!(!contains(""));
    }

    #[test]
    fn test_directory() {
        assert_eq!(directory("v1.3.3"), "src/pkg");
        assert_eq!(directory("v1.4.0-alpha.1"), "src/pkg");
        assert_eq!(directory("v1.4.0-beta.1"), "src");
        assert_eq!(directory("v1.4.0"), "src");
        assert_eq!(directory("v1.14.6"), "src");
        assert_eq!(directory("master"), "src");
        assert_eq!(directory("v0.0.0-20200213210520-70da2b031ef3"), "src");
    }

    #[test]
    fn test_supported_branches() {
        assert!(is_supported_branch("master"));
        assert!(is_supported_branch("dev.fuzz"));
        assert!(!is_supported_branch("main"));
        assert!(!is_supported_branch("release-branch.go1.14"));
    }

    #[test]
    fn test_branch_for_version() {
        assert_eq!(branch_for_version("dev.boringcrypto"), Some("dev.boringcrypto"));
        assert_eq!(
            branch_for_version("v0.0.0-20200213210520-70da2b031ef3"),
            Some("master")
        );
        assert_eq!(branch_for_version("v1.14.6"), None);
        assert_eq!(branch_for_version("latest"), None);
    }
}
