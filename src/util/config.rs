//! Configuration file support for stdver.
//!
//! stdver supports two configuration file locations:
//! - Global: `~/.stdver/config.toml` - User-wide defaults
//! - Project: `.stdver/config.toml` - Project-specific overrides
//!
//! Project config takes precedence over global config. Environment
//! variables and command-line flags are applied on top by the binary.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::util::errors::Error;

/// stdver configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// History source settings
    pub source: SourceConfig,

    /// Git settings
    pub git: GitConfig,
}

/// Where history is read from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct SourceConfig {
    /// Backend kind (remote, local, fixture)
    pub backend: Option<String>,

    /// Remote repository URL for the remote backend
    pub url: Option<String>,

    /// Existing clone for the local backend
    pub local_path: Option<PathBuf>,

    /// Directory of per-ref snapshots for the fixture backend
    pub fixture_dir: Option<PathBuf>,
}

/// Git-related configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GitConfig {
    /// Path to the git executable (None = search PATH)
    pub program: Option<PathBuf>,
}

/// The kinds of history source.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BackendKind {
    #[default]
    Remote,
    Local,
    Fixture,
}

impl BackendKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendKind::Remote => "remote",
            BackendKind::Local => "local",
            BackendKind::Fixture => "fixture",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BackendKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "remote" => Ok(BackendKind::Remote),
            "local" => Ok(BackendKind::Local),
            "fixture" => Ok(BackendKind::Fixture),
            _ => Err(Error::invalid_argument(format!(
                "unknown backend `{}` (expected remote, local or fixture)",
                s
            ))),
        }
    }
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    /// Load configuration with fallback to defaults if file doesn't exist.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_else(|e| {
                tracing::warn!("Failed to load config from {}: {:#}", path.display(), e);
                Self::default()
            })
        } else {
            Self::default()
        }
    }

    /// Merge another config into this one (other takes precedence).
    pub fn merge(&mut self, other: Config) {
        if other.source.backend.is_some() {
            self.source.backend = other.source.backend;
        }
        if other.source.url.is_some() {
            self.source.url = other.source.url;
        }
        if other.source.local_path.is_some() {
            self.source.local_path = other.source.local_path;
        }
        if other.source.fixture_dir.is_some() {
            self.source.fixture_dir = other.source.fixture_dir;
        }

        if other.git.program.is_some() {
            self.git.program = other.git.program;
        }
    }

    /// Parse the configured backend kind.
    pub fn backend(&self) -> Result<BackendKind> {
        match &self.source.backend {
            Some(s) => Ok(s.parse()?),
            None => Ok(BackendKind::default()),
        }
    }
}

/// Load merged configuration from global and project locations.
///
/// Order of precedence (highest to lowest):
/// 1. Project config (.stdver/config.toml)
/// 2. Global config (~/.stdver/config.toml)
/// 3. Defaults
pub fn load_config(global_path: Option<&Path>, project_path: &Path) -> Config {
    let mut config = Config::default();

    if let Some(global_path) = global_path {
        config.merge(Config::load_or_default(global_path));
    }

    config.merge(Config::load_or_default(project_path));

    config
}

/// Get the global stdver config directory (~/.stdver).
pub fn global_config_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(".stdver"))
}

/// Get the global config path (~/.stdver/config.toml).
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("config.toml"))
}

/// Get the project config path (.stdver/config.toml).
pub fn project_config_path(project_root: &Path) -> PathBuf {
    project_root.join(".stdver").join("config.toml")
}
