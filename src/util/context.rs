//! Global context for stdver operations.
//!
//! Provides centralized access to configuration, paths, and the selected
//! history backend.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use url::Url;

use crate::sources::fixture::default_commit_time;
use crate::sources::{FixtureBackend, FixtureHistory, LocalBackend, RemoteBackend, RepoBackend};
use crate::stdlib::GO_REPO_URL;
use crate::util::config::{
    global_config_path, load_config, project_config_path, BackendKind, Config,
};
use crate::util::errors::Error;
use crate::util::process::find_git;

/// Global context containing configuration and paths.
#[derive(Debug, Clone)]
pub struct GlobalContext {
    /// Current working directory
    cwd: PathBuf,

    /// Merged global and project configuration
    config: Config,
}

impl GlobalContext {
    /// Create a new GlobalContext for the current directory.
    pub fn new() -> Result<Self> {
        let cwd = std::env::current_dir().context("failed to get current directory")?;
        Ok(Self::with_cwd(cwd))
    }

    /// Create a GlobalContext with a specific working directory.
    pub fn with_cwd(cwd: PathBuf) -> Self {
        let config = load_config(global_config_path().as_deref(), &project_config_path(&cwd));
        GlobalContext { cwd, config }
    }

    /// Replace the loaded configuration.
    pub fn with_config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Get the current working directory.
    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Get a mutable reference to the configuration, for command-line
    /// overrides.
    pub fn config_mut(&mut self) -> &mut Config {
        &mut self.config
    }

    /// Resolve a configured path against the working directory.
    fn resolve_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.cwd.join(path)
        }
    }

    /// Build the configured history backend.
    pub fn backend(&self) -> Result<Box<dyn RepoBackend>> {
        let source = &self.config.source;
        let backend: Box<dyn RepoBackend> = match self.config.backend()? {
            BackendKind::Remote => {
                let url = source.url.as_deref().unwrap_or(GO_REPO_URL);
                let url = Url::parse(url).map_err(|e| {
                    Error::invalid_argument(format!("invalid repository URL `{}`: {}", url, e))
                })?;
                let git = find_git(self.config.git.program.as_deref())?;
                Box::new(RemoteBackend::with_git(url, git))
            }
            BackendKind::Local => {
                let path = source.local_path.as_deref().ok_or_else(|| {
                    Error::invalid_argument("the local backend needs a clone path (--local-path)")
                })?;
                Box::new(LocalBackend::new(self.resolve_path(path))?)
            }
            BackendKind::Fixture => match source.fixture_dir.as_deref() {
                Some(dir) => {
                    let history =
                        FixtureHistory::from_dir(&self.resolve_path(dir), default_commit_time())?;
                    Box::new(FixtureBackend::new(history))
                }
                None => Box::new(FixtureBackend::standard()),
            },
        };
        tracing::debug!("Using {} backend", backend.name());
        Ok(backend)
    }
}
