//! Test utilities for stdver unit tests.
//!
//! This module provides helpers for building histories that the backends
//! can read: on-disk clones for the local backend and per-ref snapshot
//! directories for the fixture backend.
//!
//! # Example
//!
//! ```rust,ignore
//! use stdver::test_support::{init_clone, fixed_time};
//!
//! #[test]
//! fn test_example() {
//!     let tmp = tempfile::TempDir::new().unwrap();
//!     let head = init_clone(tmp.path(), &["refs/tags/go1.14.6"], &[("src/go.mod", "module std\n")]);
//!     // Point a LocalBackend at tmp.path()...
//! }
//! ```

pub mod fixtures;

use std::path::Path;

use chrono::{DateTime, TimeZone, Utc};
use git2::{Oid, Repository, Signature, Time};

// Re-export fixtures for convenience
pub use fixtures::*;

/// A fixed, second-precision commit time for deterministic hashes.
pub fn fixed_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2020, 7, 16, 20, 51, 52).unwrap()
}

/// Initialize a repository at `dir` with one commit holding `files`, and
/// point every name in `refs` at it.
///
/// Panics on failure; only for use in tests.
pub fn init_clone(dir: &Path, refs: &[&str], files: &[(&str, &str)]) -> Oid {
    let repo = Repository::init(dir).unwrap();
    for (path, content) in files {
        let full = dir.join(path);
        std::fs::create_dir_all(full.parent().unwrap()).unwrap();
        std::fs::write(&full, content).unwrap();
    }

    let mut index = repo.index().unwrap();
    for (path, _) in files {
        index.add_path(Path::new(path)).unwrap();
    }
    index.write().unwrap();
    let tree_id = index.write_tree().unwrap();
    let tree = repo.find_tree(tree_id).unwrap();

    let sig = Signature::new(
        "Gopher",
        "gopher@example.com",
        &Time::new(fixed_time().timestamp(), 0),
    )
    .unwrap();
    let oid = repo.commit(None, &sig, &sig, "initial", &tree, &[]).unwrap();
    for name in refs {
        repo.reference(name, oid, true, "test ref").unwrap();
    }
    oid
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_init_clone() {
        let tmp = TempDir::new().unwrap();
        let oid = init_clone(
            tmp.path(),
            &["refs/tags/go1.12", "refs/heads/master"],
            &[("src/errors/errors.go", "package errors\n")],
        );

        let repo = Repository::open(tmp.path()).unwrap();
        let tagged = repo.find_reference("refs/tags/go1.12").unwrap();
        assert_eq!(tagged.target(), Some(oid));
        assert!(tmp.path().join("src/errors/errors.go").exists());
    }
}
