//! Remote source - history fetched from the upstream repository.
//!
//! Talks to the remote through the `git` command line so that failures
//! surface with the exact command and its stderr.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use url::Url;

use crate::sources::backend::{ref_name_for_version, short_ref_name, RepoBackend, RepoRef};
use crate::stdlib::GO_REPO_URL;
use crate::util::cancel::CancelToken;
use crate::util::process::{find_git, ProcessBuilder};

/// A backend cloning single references from a remote URL.
#[derive(Debug, Clone)]
pub struct RemoteBackend {
    /// Remote repository URL
    url: Url,

    /// Path to the `git` executable
    git: PathBuf,
}

impl RemoteBackend {
    /// Create a backend for `url`, locating `git` on PATH.
    pub fn new(url: Url) -> Result<Self> {
        let git = find_git(None)?;
        Ok(RemoteBackend { url, git })
    }

    /// Create a backend for `url` using an explicit `git` executable.
    pub fn with_git(url: Url, git: impl Into<PathBuf>) -> Self {
        RemoteBackend {
            url,
            git: git.into(),
        }
    }

    /// Create a backend for the upstream Go repository.
    pub fn upstream() -> Result<Self> {
        let url = Url::parse(GO_REPO_URL).context("invalid upstream URL")?;
        Self::new(url)
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    fn git(&self) -> ProcessBuilder {
        ProcessBuilder::new(&self.git).env("GIT_TERMINAL_PROMPT", "0")
    }

    /// Build the shallow single-branch clone command.
    fn clone_command(&self, refname: &str, dest: &Path) -> ProcessBuilder {
        self.git()
            .args(["-c", "advice.detachedHead=false", "clone", "--quiet"])
            .args(["--depth=1", "--single-branch", "--branch"])
            .arg(short_ref_name(refname))
            .arg(self.url.as_str())
            .arg(dest)
    }
}

impl RepoBackend for RemoteBackend {
    fn name(&self) -> &str {
        "remote"
    }

    fn clone_ref(&self, version: &str, dest: &Path, cancel: &CancelToken) -> Result<String> {
        let refname = ref_name_for_version(version)?;
        tracing::info!("Cloning {} at {}", self.url, short_ref_name(&refname));

        self.clone_command(&refname, dest)
            .exec_and_check(cancel)
            .with_context(|| format!("clone_ref({:?}, {})", version, dest.display()))?;

        let output = self
            .git()
            .arg("-C")
            .arg(dest)
            .args(["rev-parse", "HEAD"])
            .exec_and_check(cancel)
            .with_context(|| format!("clone_ref({:?}, {})", version, dest.display()))?;

        let hash = output.stdout_lossy().trim().to_string();
        tracing::debug!("Cloned {} at {}", refname, hash);
        Ok(hash)
    }

    fn refs(&self, cancel: &CancelToken) -> Result<Vec<RepoRef>> {
        let output = self
            .git()
            .arg("ls-remote")
            .arg(self.url.as_str())
            .exec_and_check(cancel)
            .with_context(|| format!("refs({})", self.url))?;

        Ok(parse_ls_remote(&output.stdout_lossy()))
    }
}

/// Parse `git ls-remote` output (`<hash>\t<refname>` per line).
///
/// Peeled tag lines (`refs/tags/x^{}`) repeat a tag already listed and are
/// dropped.
fn parse_ls_remote(output: &str) -> Vec<RepoRef> {
    output
        .lines()
        .filter_map(|line| {
            let (hash, name) = line.split_once('\t')?;
            let name = name.trim();
            if name.ends_with("^{}") {
                return None;
            }
            Some(RepoRef::new(hash.trim(), name))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ls_remote() {
        let output = "\
7e2b5a7bd3b4b7bb1b2715cbe8fc1a6aa6e5d4e5\tHEAD
7e2b5a7bd3b4b7bb1b2715cbe8fc1a6aa6e5d4e5\trefs/heads/master
1a11ecd74d752bdf7cb9126f9c212c69fb5b6a2d\trefs/changes/01/12301/1
d491e550c3a7e5e2c5a3da48c3d9c5b5a4f7b8a1\trefs/tags/go1.12
0c9a2d0d4b7e5b12c5ee0ec38c3f8c5b0c1f2e3d\trefs/tags/go1.12^{}
";
        let refs = parse_ls_remote(output);
        let names: Vec<&str> = refs.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "HEAD",
                "refs/heads/master",
                "refs/changes/01/12301/1",
                "refs/tags/go1.12"
            ]
        );
        assert_eq!(refs[3].hash, "d491e550c3a7e5e2c5a3da48c3d9c5b5a4f7b8a1");
    }

    #[test]
    fn test_clone_command() {
        let url = Url::parse("https://go.googlesource.com/go").unwrap();
        let backend = RemoteBackend::with_git(url, "git");
        let cmd = backend.clone_command("refs/tags/go1.14.6", Path::new("/tmp/std"));

        assert_eq!(
            cmd.display_command(),
            "git -c advice.detachedHead=false clone --quiet --depth=1 --single-branch \
             --branch go1.14.6 https://go.googlesource.com/go /tmp/std"
        );
    }

    #[test]
    fn test_missing_git_is_upstream() {
        let url = Url::parse("https://go.googlesource.com/go").unwrap();
        let backend = RemoteBackend::with_git(url, "/nonexistent/git");

        let err = backend.refs(&CancelToken::new()).unwrap_err();
        assert_eq!(
            crate::util::errors::Error::kind_of(&err),
            Some(crate::util::errors::ErrorKind::Upstream)
        );
        assert!(format!("{:#}", err).contains("/nonexistent/git"));
    }

    #[test]
    fn test_clone_ref_rejects_bad_version_before_spawning() {
        let url = Url::parse("https://go.googlesource.com/go").unwrap();
        let backend = RemoteBackend::with_git(url, "/nonexistent/git");
        let tmp = tempfile::TempDir::new().unwrap();

        let err = backend
            .clone_ref("not-a-version", tmp.path(), &CancelToken::new())
            .unwrap_err();
        assert_eq!(
            crate::util::errors::Error::kind_of(&err),
            Some(crate::util::errors::ErrorKind::InvalidArgument)
        );
    }
}
