//! Test fixtures for common test scenarios.
//!
//! This module provides snapshot directories in the layout
//! [`FixtureHistory::from_dir`](crate::sources::FixtureHistory::from_dir)
//! reads: one subdirectory per ref holding that ref's files.

use std::path::{Path, PathBuf};

/// A ref snapshot to write to disk.
#[derive(Debug, Clone)]
pub struct SnapshotFixture {
    /// Short ref name (`go1.14.6`, `master`).
    pub name: String,
    /// Files (path relative to the repository root -> content).
    pub files: Vec<(PathBuf, String)>,
}

impl SnapshotFixture {
    /// Create a new empty snapshot.
    pub fn new(name: impl Into<String>) -> Self {
        SnapshotFixture {
            name: name.into(),
            files: Vec::new(),
        }
    }

    /// A minimal library tree under `src`.
    pub fn library(name: impl Into<String>) -> Self {
        Self::new(name)
            .with_file("LICENSE", "Copyright (c) 2009 The Go Authors.\n")
            .with_file("README.md", "# The Go Programming Language\n")
            .with_file("src/go.mod", "module std\n")
            .with_file("src/errors/errors.go", "package errors\n")
    }

    /// Add a file.
    pub fn with_file(mut self, path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        self.files.push((path.into(), content.into()));
        self
    }

    /// Write the snapshot under `root/<name>`, returning its directory.
    pub fn write_to(&self, root: &Path) -> std::io::Result<PathBuf> {
        let dir = root.join(&self.name);
        std::fs::create_dir_all(&dir)?;
        for (path, content) in &self.files {
            let full = dir.join(path);
            if let Some(parent) = full.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(full, content)?;
        }
        Ok(dir)
    }
}

/// Write every snapshot under `root`.
pub fn write_history(root: &Path, snapshots: &[SnapshotFixture]) -> std::io::Result<()> {
    for snapshot in snapshots {
        snapshot.write_to(root)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::FixtureHistory;
    use crate::test_support::fixed_time;
    use tempfile::TempDir;

    #[test]
    fn test_written_history_loads() {
        let tmp = TempDir::new().unwrap();
        write_history(
            tmp.path(),
            &[
                SnapshotFixture::library("go1.14.6"),
                SnapshotFixture::library("master").with_file("src/cmd/README.vendor", "cmd\n"),
            ],
        )
        .unwrap();

        let history = FixtureHistory::from_dir(tmp.path(), fixed_time()).unwrap();
        let names: Vec<&str> = history.refs().iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["refs/tags/go1.14.6", "refs/heads/master"]);
        assert!(history.refs()[1].files.contains_key("src/cmd/README.vendor"));
    }
}
