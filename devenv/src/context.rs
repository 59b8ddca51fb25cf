//! Caller-supplied run context.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::io::config::ConfigError;

/// Key under which callers pass the repository root.
pub const REPOROOT_KEY: &str = "reporoot";

/// Immutable inputs for one `devenv sync` run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncContext {
    reporoot: PathBuf,
}

impl SyncContext {
    /// Build a context from an absolute repository root.
    pub fn new(reporoot: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let reporoot = reporoot.into();
        if !reporoot.is_absolute() {
            return Err(ConfigError::RelativeReporoot(reporoot));
        }
        Ok(Self { reporoot })
    }

    /// Build a context from a string map carrying at least `reporoot`.
    pub fn from_map(map: &BTreeMap<String, String>) -> Result<Self, ConfigError> {
        let reporoot = map
            .get(REPOROOT_KEY)
            .ok_or_else(|| ConfigError::MissingContextKey(REPOROOT_KEY.to_string()))?;
        Self::new(reporoot)
    }

    pub fn reporoot(&self) -> &Path {
        &self.reporoot
    }

    /// Repository-local tool directory (`<reporoot>/.devenv`).
    pub fn devenv_dir(&self) -> PathBuf {
        self.reporoot.join(".devenv")
    }

    /// Where repository-local tool binaries are installed.
    pub fn devenv_bin(&self) -> PathBuf {
        self.devenv_dir().join("bin")
    }

    /// Repository-local virtual environment (`<reporoot>/.venv`).
    pub fn venv(&self) -> PathBuf {
        self.reporoot.join(".venv")
    }

    pub fn venv_bin(&self) -> PathBuf {
        self.venv().join("bin")
    }
}
