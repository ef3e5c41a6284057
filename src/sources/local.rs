//! Local source - history read from an existing clone on disk.
//!
//! The clone is never modified. Checkouts resolve references in place, and
//! references come from the clone's own ref database.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use git2::build::CheckoutBuilder;
use git2::{FetchOptions, Oid, ReferenceType, RemoteCallbacks, Repository};

use crate::sources::backend::{peel_ref, ref_name_for_version, Checkout, RepoBackend, RepoRef};
use crate::util::cancel::CancelToken;
use crate::util::errors::{git_error, Error};

/// A backend bound to a pre-existing local clone.
#[derive(Debug, Clone)]
pub struct LocalBackend {
    path: PathBuf,
}

impl LocalBackend {
    /// Bind to the clone at `path`, failing if it is not a repository.
    pub fn new(path: impl Into<PathBuf>) -> Result<Self> {
        let backend = LocalBackend { path: path.into() };
        backend.open()?;
        Ok(backend)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn open(&self) -> Result<Repository> {
        Repository::open(&self.path)
            .map_err(|e| git_error(format!("open {}", self.path.display()), e).into())
    }

    /// The local reference holding `version`.
    ///
    /// Branches may only exist as remote-tracking refs in a plain clone.
    fn find_ref(&self, repo: &Repository, version: &str) -> Result<(String, Oid)> {
        let refname = ref_name_for_version(version)?;
        let mut candidates = vec![refname.clone()];
        if let Some(branch) = refname.strip_prefix("refs/heads/") {
            candidates.push(format!("refs/remotes/origin/{}", branch));
        }

        for candidate in candidates {
            if repo.find_reference(&candidate).is_ok() {
                let oid = peel_ref(repo, &candidate)?;
                return Ok((candidate, oid));
            }
        }
        Err(Error::not_found(format!("{} in {}", refname, self.path.display())).into())
    }
}

impl RepoBackend for LocalBackend {
    fn name(&self) -> &str {
        "local"
    }

    fn clone_ref(&self, version: &str, dest: &Path, cancel: &CancelToken) -> Result<String> {
        cancel.check()?;
        let source = self.open()?;
        let (refname, _) = self
            .find_ref(&source, version)
            .with_context(|| format!("clone_ref({:?}, {})", version, dest.display()))?;
        let target = ref_name_for_version(version)?;

        tracing::info!("Cloning {} from {}", refname, self.path.display());

        let repo = Repository::init(dest)
            .map_err(|e| git_error(format!("init {}", dest.display()), e))?;
        let url = self.path.to_string_lossy().into_owned();
        let mut remote = repo
            .remote_anonymous(&url)
            .map_err(|e| git_error(format!("remote {}", url), e))?;

        let mut callbacks = RemoteCallbacks::new();
        let token = cancel.clone();
        callbacks.transfer_progress(move |_| !token.is_cancelled());
        let mut options = FetchOptions::new();
        options.remote_callbacks(callbacks);

        let refspec = format!("+{}:{}", refname, target);
        remote
            .fetch(&[refspec.as_str()], Some(&mut options), None)
            .map_err(|e| {
                if cancel.is_cancelled() {
                    Error::Cancelled
                } else {
                    git_error(format!("fetch {} from {}", refspec, url), e)
                }
            })?;

        let head = peel_ref(&repo, &target)?;
        repo.set_head_detached(head)
            .map_err(|e| git_error("set HEAD", e))?;
        repo.checkout_head(Some(CheckoutBuilder::new().force()))
            .map_err(|e| git_error(format!("checkout {}", target), e))?;

        Ok(head.to_string())
    }

    fn refs(&self, cancel: &CancelToken) -> Result<Vec<RepoRef>> {
        cancel.check()?;
        let repo = self.open()?;
        let references = repo
            .references()
            .map_err(|e| git_error("list references", e))?;

        let mut refs = Vec::new();
        for reference in references {
            let reference = reference.map_err(|e| git_error("read reference", e))?;
            if reference.kind() == Some(ReferenceType::Symbolic) {
                continue;
            }
            let Some(name) = reference.name() else {
                tracing::debug!("Skipping reference with non-UTF-8 name");
                continue;
            };
            let hash = match reference.peel_to_commit() {
                Ok(commit) => commit.id(),
                Err(_) => match reference.target() {
                    Some(oid) => oid,
                    None => continue,
                },
            };
            refs.push(RepoRef::new(hash.to_string(), name));
        }
        Ok(refs)
    }

    fn checkout(&self, version: &str, cancel: &CancelToken) -> Result<Checkout> {
        cancel.check()?;
        let repo = self.open()?;
        let (refname, head) = self
            .find_ref(&repo, version)
            .with_context(|| format!("checkout({:?})", version))?;
        tracing::debug!("Resolved {} to {} in {}", refname, head, self.path.display());
        Ok(Checkout::new(repo, head, None))
    }
}
