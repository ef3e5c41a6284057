//! Fixture source - canned history replayed without any network access.
//!
//! Every reference is committed on demand into an in-memory object
//! database, so hashes are stable for identical content and commit times.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, TimeZone, Utc};
use git2::{Odb, Oid, Repository, Signature, Time};
use walkdir::WalkDir;

use crate::sources::backend::{ref_name_for_version, Checkout, RepoBackend, RepoRef};
use crate::stdlib::is_supported_branch;
use crate::util::cancel::CancelToken;
use crate::util::errors::{git_error, Error};

/// Priority of the in-memory object backend.
const MEMPACK_PRIORITY: i32 = 1000;

const FILE_MODE: i32 = 0o100644;
const TREE_MODE: i32 = 0o040000;

const FIXTURE_AUTHOR: &str = "Fixture";
const FIXTURE_EMAIL: &str = "fixture@example.com";

/// One reference of a fixture history with its snapshot of files.
#[derive(Debug, Clone)]
pub struct FixtureRef {
    /// Full reference name.
    pub name: String,
    pub commit_time: DateTime<Utc>,
    /// Repository-relative paths (`/`-separated) to contents.
    pub files: BTreeMap<String, Vec<u8>>,
}

/// A set of references to replay.
#[derive(Debug, Clone, Default)]
pub struct FixtureHistory {
    refs: Vec<FixtureRef>,
}

impl FixtureHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a reference under its full name.
    pub fn with_ref<I, P, C>(mut self, name: &str, commit_time: DateTime<Utc>, files: I) -> Self
    where
        I: IntoIterator<Item = (P, C)>,
        P: Into<String>,
        C: Into<Vec<u8>>,
    {
        self.refs.push(FixtureRef {
            name: name.to_string(),
            commit_time,
            files: files
                .into_iter()
                .map(|(path, content)| (path.into(), content.into()))
                .collect(),
        });
        self
    }

    /// Add a tag.
    pub fn with_tag<I, P, C>(self, tag: &str, commit_time: DateTime<Utc>, files: I) -> Self
    where
        I: IntoIterator<Item = (P, C)>,
        P: Into<String>,
        C: Into<Vec<u8>>,
    {
        self.with_ref(&format!("refs/tags/{}", tag), commit_time, files)
    }

    /// Add a branch.
    pub fn with_branch<I, P, C>(self, branch: &str, commit_time: DateTime<Utc>, files: I) -> Self
    where
        I: IntoIterator<Item = (P, C)>,
        P: Into<String>,
        C: Into<Vec<u8>>,
    {
        self.with_ref(&format!("refs/heads/{}", branch), commit_time, files)
    }

    /// Load a history from a directory holding one subdirectory per ref.
    ///
    /// Subdirectories named after a supported branch become branches, all
    /// others tags. Every ref shares `commit_time`.
    pub fn from_dir(root: &Path, commit_time: DateTime<Utc>) -> Result<Self> {
        let mut history = FixtureHistory::new();

        let mut dirs: Vec<PathBuf> = std::fs::read_dir(root)
            .with_context(|| format!("failed to read fixture directory: {}", root.display()))?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.is_dir())
            .collect();
        dirs.sort();

        for dir in dirs {
            let name = dir
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();

            let mut files = BTreeMap::new();
            for entry in WalkDir::new(&dir).sort_by_file_name() {
                let entry = entry
                    .with_context(|| format!("failed to walk fixture: {}", dir.display()))?;
                if !entry.file_type().is_file() {
                    continue;
                }
                let relative = entry
                    .path()
                    .strip_prefix(&dir)
                    .with_context(|| format!("fixture path outside {}", dir.display()))?;
                let key = relative
                    .components()
                    .map(|c| c.as_os_str().to_string_lossy().into_owned())
                    .collect::<Vec<_>>()
                    .join("/");
                let content = std::fs::read(entry.path())
                    .with_context(|| format!("failed to read file: {}", entry.path().display()))?;
                files.insert(key, content);
            }

            history = if is_supported_branch(&name) {
                history.with_branch(&name, commit_time, files)
            } else {
                history.with_tag(&name, commit_time, files)
            };
        }
        Ok(history)
    }

    /// A small stand-in for the real history.
    ///
    /// Tags `go1.3` (legacy `src/pkg` layout), `go1.12`, `go1.13beta1`,
    /// `go1.14.6`, the `master` branch, and refs that are not versions.
    pub fn standard() -> Self {
        FixtureHistory::new()
            .with_tag("go1.3", utc(2014, 6, 18, 17, 7, 22), go_tree("go1.3", "src/pkg"))
            .with_tag("go1.12", utc(2019, 2, 25, 21, 58, 2), go_tree("go1.12", "src"))
            .with_tag(
                "go1.13beta1",
                utc(2019, 6, 26, 16, 44, 10),
                go_tree("go1.13beta1", "src"),
            )
            .with_tag("go1.14.6", utc(2020, 7, 16, 20, 51, 52), go_tree("go1.14.6", "src"))
            .with_branch(
                "master",
                utc(2020, 9, 1, 12, 34, 56),
                go_tree("devel +c0ffee", "src"),
            )
            .with_tag("weekly.2011-12-22", utc(2011, 12, 22, 0, 0, 0), go_tree("weekly", "src/pkg"))
            .with_tag("release.r60", utc(2011, 9, 7, 0, 0, 0), go_tree("r60", "src/pkg"))
            .with_ref(
                "refs/changes/01/12301/1",
                utc(2020, 9, 2, 0, 0, 0),
                go_tree("change", "src"),
            )
    }

    pub fn refs(&self) -> &[FixtureRef] {
        &self.refs
    }

    fn find(&self, name: &str) -> Option<&FixtureRef> {
        self.refs.iter().find(|r| r.name == name)
    }
}

/// A backend replaying a [`FixtureHistory`].
#[derive(Debug, Clone)]
pub struct FixtureBackend {
    history: FixtureHistory,
}

impl FixtureBackend {
    pub fn new(history: FixtureHistory) -> Self {
        FixtureBackend { history }
    }

    /// A backend over [`FixtureHistory::standard`].
    pub fn standard() -> Self {
        Self::new(FixtureHistory::standard())
    }
}

impl RepoBackend for FixtureBackend {
    fn name(&self) -> &str {
        "fixture"
    }

    fn clone_ref(&self, version: &str, _dest: &Path, _cancel: &CancelToken) -> Result<String> {
        Err(Error::unsupported(format!(
            "clone_ref({:?}): the fixture backend cannot clone",
            version
        ))
        .into())
    }

    fn refs(&self, cancel: &CancelToken) -> Result<Vec<RepoRef>> {
        let repo = in_memory_repo()?;
        let mut refs = Vec::with_capacity(self.history.refs.len());
        for fixture in &self.history.refs {
            cancel.check()?;
            let oid = write_commit(&repo, fixture)?;
            refs.push(RepoRef::new(oid.to_string(), fixture.name.clone()));
        }
        Ok(refs)
    }

    fn checkout(&self, version: &str, cancel: &CancelToken) -> Result<Checkout> {
        cancel.check()?;
        let refname = ref_name_for_version(version)?;
        let fixture = self
            .history
            .find(&refname)
            .ok_or_else(|| Error::not_found(format!("checkout({:?}): no reference {}", version, refname)))?;

        let repo = in_memory_repo()?;
        let head = write_commit(&repo, fixture)?;
        tracing::debug!("Replayed {} as {}", refname, head);
        Ok(Checkout::new(repo, head, None))
    }
}

fn in_memory_repo() -> Result<Repository> {
    let odb = Odb::new().map_err(|e| git_error("create object database", e))?;
    odb.add_new_mempack_backend(MEMPACK_PRIORITY)
        .map_err(|e| git_error("add in-memory backend", e))?;
    Repository::from_odb(odb).map_err(|e| git_error("wrap object database", e).into())
}

fn write_commit(repo: &Repository, fixture: &FixtureRef) -> Result<Oid> {
    let entries: Vec<(&str, &[u8])> = fixture
        .files
        .iter()
        .map(|(path, content)| (path.as_str(), content.as_slice()))
        .collect();
    let tree_id = write_tree(repo, entries)?;
    let tree = repo
        .find_tree(tree_id)
        .map_err(|e| git_error(format!("find tree {}", tree_id), e))?;

    let time = Time::new(fixture.commit_time.timestamp(), 0);
    let sig = Signature::new(FIXTURE_AUTHOR, FIXTURE_EMAIL, &time)
        .map_err(|e| git_error("create signature", e))?;

    let oid = repo
        .commit(None, &sig, &sig, &fixture.name, &tree, &[])
        .map_err(|e| git_error(format!("commit {}", fixture.name), e))?;
    Ok(oid)
}

fn write_tree(repo: &Repository, entries: Vec<(&str, &[u8])>) -> Result<Oid> {
    let mut files: BTreeMap<&str, &[u8]> = BTreeMap::new();
    let mut dirs: BTreeMap<&str, Vec<(&str, &[u8])>> = BTreeMap::new();
    for (path, content) in entries {
        match path.split_once('/') {
            Some((dir, rest)) => dirs.entry(dir).or_default().push((rest, content)),
            None => {
                files.insert(path, content);
            }
        }
    }

    let mut builder = repo
        .treebuilder(None)
        .map_err(|e| git_error("create tree builder", e))?;
    for (name, content) in files {
        let blob = repo
            .blob(content)
            .map_err(|e| git_error(format!("write blob {}", name), e))?;
        builder
            .insert(name, blob, FILE_MODE)
            .map_err(|e| git_error(format!("insert {}", name), e))?;
    }
    for (name, children) in dirs {
        let subtree = write_tree(repo, children)?;
        builder
            .insert(name, subtree, TREE_MODE)
            .map_err(|e| git_error(format!("insert {}/", name), e))?;
    }
    builder
        .write()
        .map_err(|e| git_error("write tree", e).into())
}

/// Commit time given to histories loaded with [`FixtureHistory::from_dir`]
/// when no other time is known.
pub fn default_commit_time() -> DateTime<Utc> {
    utc(2020, 1, 1, 0, 0, 0)
}

fn utc(year: i32, month: u32, day: u32, hour: u32, min: u32, sec: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, hour, min, sec)
        .single()
        .unwrap_or_default()
}

/// Files laid out like a Go checkout, with the library under `libdir`.
fn go_tree(label: &str, libdir: &str) -> Vec<(String, Vec<u8>)> {
    let lib = |path: &str| format!("{}/{}", libdir, path);
    vec![
        ("README.md".to_string(), b"# The Go Programming Language\n".to_vec()),
        ("LICENSE".to_string(), b"Copyright (c) 2009 The Go Authors.\n".to_vec()),
        ("VERSION".to_string(), format!("{}\n", label).into_bytes()),
        (".gitignore".to_string(), b"/bin/\n".to_vec()),
        ("api/go1.txt".to_string(), b"pkg errors, func New(string) error\n".to_vec()),
        (lib("README.vendor"), b"Vendoring in std and cmd\n".to_vec()),
        (lib("go.mod"), b"module std\n".to_vec()),
        (lib("all.bash"), b"#!/usr/bin/env bash\n".to_vec()),
        (
            lib("errors/errors.go"),
            b"// Package errors implements functions to manipulate errors.\npackage errors\n"
                .to_vec(),
        ),
        (lib("errors/errors_test.go"), b"package errors_test\n".to_vec()),
        (lib("errors/testdata/golden.txt"), b"golden\n".to_vec()),
        (lib("errors/.gitattributes"), b"* -text\n".to_vec()),
        (lib("fmt/print.go"), b"package fmt\n".to_vec()),
        (lib("cmd/README.vendor"), b"See src/README.vendor\n".to_vec()),
        (lib("cmd/go/main.go"), b"package main\n".to_vec()),
        (lib("_obsolete/old.go"), b"package old\n".to_vec()),
    ]
}
