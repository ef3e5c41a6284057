//! RepoBackend trait - the capability surface every history source offers.

use std::path::Path;

use anyhow::{Context, Result};
use git2::{Oid, Repository};
use tempfile::TempDir;

use crate::stdlib::{is_supported_branch, tag_for_version};
use crate::util::cancel::CancelToken;
use crate::util::errors::{git_error, Error};

/// A named point in the repository history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoRef {
    /// Full commit (or tag object) hash.
    pub hash: String,
    /// Full reference name, e.g. `refs/tags/go1.14.6`.
    pub name: String,
}

impl RepoRef {
    pub fn new(hash: impl Into<String>, name: impl Into<String>) -> Self {
        RepoRef {
            hash: hash.into(),
            name: name.into(),
        }
    }

    /// The name with the tag/branch namespace removed.
    ///
    /// Names outside those namespaces are returned unchanged.
    pub fn short_name(&self) -> &str {
        short_ref_name(&self.name)
    }
}

/// Strip `refs/tags/`, `refs/heads/` or `refs/remotes/origin/`.
pub fn short_ref_name(name: &str) -> &str {
    ["refs/tags/", "refs/heads/", "refs/remotes/origin/"]
        .iter()
        .find_map(|prefix| name.strip_prefix(prefix))
        .unwrap_or(name)
}

/// The full reference name holding `version`.
pub fn ref_name_for_version(version: &str) -> Result<String> {
    if is_supported_branch(version) {
        return Ok(format!("refs/heads/{}", version));
    }
    let tag = tag_for_version(version)
        .with_context(|| format!("ref_name_for_version({:?})", version))?;
    if is_supported_branch(&tag) {
        Ok(format!("refs/heads/{}", tag))
    } else {
        Ok(format!("refs/tags/{}", tag))
    }
}

/// A checked-out revision, owned by the request that produced it.
///
/// Dropping the checkout releases the repository and, for on-disk clones,
/// deletes the temporary directory.
pub struct Checkout {
    repo: Repository,
    head: Oid,
    _dir: Option<TempDir>,
}

impl Checkout {
    pub fn new(repo: Repository, head: Oid, dir: Option<TempDir>) -> Self {
        Checkout {
            repo,
            head,
            _dir: dir,
        }
    }

    /// The repository holding the revision's objects.
    pub fn repo(&self) -> &Repository {
        &self.repo
    }

    /// The checked-out commit.
    pub fn head(&self) -> Oid {
        self.head
    }
}

/// A source of standard library history.
///
/// Implementations are selected by explicit configuration and passed to
/// every resolution call.
pub trait RepoBackend {
    /// Get the backend name for display.
    fn name(&self) -> &str;

    /// Clone the single reference holding `version` into `dest` at minimal
    /// depth, returning the hash of its head commit.
    fn clone_ref(&self, version: &str, dest: &Path, cancel: &CancelToken) -> Result<String>;

    /// List every reference known to the backend.
    fn refs(&self, cancel: &CancelToken) -> Result<Vec<RepoRef>>;

    /// Produce a request-scoped checkout of `version`.
    ///
    /// The default clones into a fresh temporary directory.
    fn checkout(&self, version: &str, cancel: &CancelToken) -> Result<Checkout> {
        let dir = tempfile::Builder::new()
            .prefix("stdver-")
            .tempdir()
            .context("failed to create checkout directory")?;

        let hash = self.clone_ref(version, dir.path(), cancel)?;
        let head = Oid::from_str(hash.trim()).map_err(|e| git_error("parse head hash", e))?;
        let repo = Repository::open(dir.path())
            .map_err(|e| git_error(format!("open {}", dir.path().display()), e))?;

        Ok(Checkout::new(repo, head, Some(dir)))
    }
}

/// Resolve `refname` in `repo` to the commit it points at.
pub fn peel_ref(repo: &Repository, refname: &str) -> Result<Oid> {
    let reference = repo
        .find_reference(refname)
        .map_err(|_| Error::not_found(format!("no reference {}", refname)))?;
    let commit = reference
        .peel_to_commit()
        .map_err(|e| git_error(format!("peel {}", refname), e))?;
    Ok(commit.id())
}
