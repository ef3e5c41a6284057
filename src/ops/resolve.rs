//! Resolution of requested versions against a repository history.

use std::collections::{BTreeMap, BTreeSet};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use git2::{Commit, Oid};

use crate::core::sort_key::for_sorting;
use crate::core::version::{canonical, is_valid, pseudo_version, LATEST};
use crate::resolver::latest_of;
use crate::sources::{Checkout, RepoBackend};
use crate::stdlib::{is_supported_branch, version_for_tag, BRANCH_PSEUDO_PREFIX};
use crate::util::cancel::CancelToken;
use crate::util::errors::{git_error, Error};

/// A requested version pinned to a concrete commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRevision {
    /// Resolved semantic version, a pseudo-version for branch requests.
    pub version: String,
    /// Full commit hash.
    pub hash: String,
    /// Committer time of the commit.
    pub commit_time: DateTime<Utc>,
    /// Root tree of the commit.
    pub tree: Oid,
}

/// Every released version in the history, newest first.
///
/// References that do not name a release are skipped.
pub fn versions(backend: &dyn RepoBackend, cancel: &CancelToken) -> Result<Vec<String>> {
    let refs = backend
        .refs(cancel)
        .with_context(|| format!("versions({})", backend.name()))?;

    let mut seen = BTreeSet::new();
    let mut versions = Vec::new();
    for r in &refs {
        match version_for_tag(r.short_name()) {
            Some(v) if is_valid(&v) => {
                if seen.insert(v.clone()) {
                    versions.push(v);
                }
            }
            _ => tracing::debug!("Skipping reference {}", r.name),
        }
    }

    versions.sort_by_cached_key(|v| std::cmp::Reverse(for_sorting(v)));
    Ok(versions)
}

/// Resolve `requested` to a version that exists in the history.
///
/// Accepts a supported branch, [`LATEST`], a release tag or a semantic
/// version. Branches are returned unchanged, versions in the form the
/// history lists them (`v1.12` resolves to `v1.12.0`).
pub fn resolve_version(
    backend: &dyn RepoBackend,
    requested: &str,
    cancel: &CancelToken,
) -> Result<String> {
    if is_supported_branch(requested) {
        return Ok(requested.to_string());
    }

    let candidate = if requested == LATEST || is_valid(requested) {
        requested.to_string()
    } else if let Some(v) = version_for_tag(requested) {
        v
    } else {
        return Err(Error::invalid_argument(format!(
            "resolve_version({:?}): not a version, tag or supported branch",
            requested
        ))
        .into());
    };

    let known = versions(backend, cancel)
        .with_context(|| format!("resolve_version({:?})", requested))?;

    if candidate == LATEST {
        return latest_of(&known).ok_or_else(|| {
            Error::not_found(format!("resolve_version({:?}): no versions", requested)).into()
        });
    }

    let wanted = canonical(&candidate);
    match known.iter().find(|v| canonical(v) == wanted) {
        Some(v) => Ok(v.clone()),
        None => Err(Error::not_found(format!(
            "resolve_version({:?}): {} is not in the history",
            requested, candidate
        ))
        .into()),
    }
}

/// Resolve `requested` and check out its commit.
///
/// The returned checkout must be kept alive for as long as objects are
/// read from the revision's tree.
pub fn resolve_revision(
    backend: &dyn RepoBackend,
    requested: &str,
    cancel: &CancelToken,
) -> Result<(Checkout, ResolvedRevision)> {
    let resolved = resolve_version(backend, requested, cancel)?;
    let checkout = backend
        .checkout(&resolved, cancel)
        .with_context(|| format!("resolve_revision({:?})", requested))?;

    let commit = checkout
        .repo()
        .find_commit(checkout.head())
        .map_err(|e| git_error(format!("find commit {}", checkout.head()), e))?;
    let hash = commit.id().to_string();
    let commit_time = commit_time(&commit)?;
    let tree = commit.tree_id();

    let version = if is_supported_branch(&resolved) {
        pseudo_version(BRANCH_PSEUDO_PREFIX, commit_time, &hash)
    } else {
        resolved
    };
    tracing::debug!("Resolved {} to {} ({})", requested, version, hash);

    drop(commit);
    let revision = ResolvedRevision {
        version,
        hash,
        commit_time,
        tree,
    };
    Ok((checkout, revision))
}

/// Head hashes of the supported branches present in the history.
pub fn resolve_supported_branches(
    backend: &dyn RepoBackend,
    cancel: &CancelToken,
) -> Result<BTreeMap<String, String>> {
    let refs = backend
        .refs(cancel)
        .with_context(|| format!("resolve_supported_branches({})", backend.name()))?;

    let mut branches = BTreeMap::new();
    for r in refs {
        let is_branch_ref =
            r.name.starts_with("refs/heads/") || r.name.starts_with("refs/remotes/origin/");
        if is_branch_ref && is_supported_branch(r.short_name()) {
            branches
                .entry(r.short_name().to_string())
                .or_insert_with(|| r.hash.clone());
        }
    }
    Ok(branches)
}

/// Committer time of `commit` in UTC.
pub fn commit_time(commit: &Commit<'_>) -> Result<DateTime<Utc>> {
    let seconds = commit.time().seconds();
    DateTime::from_timestamp(seconds, 0).ok_or_else(|| {
        Error::upstream(
            format!("read time of commit {}", commit.id()),
            format!("timestamp {} out of range", seconds),
        )
        .into()
    })
}
