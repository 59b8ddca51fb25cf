//! Repository configuration stored under `devenv/config.toml`.
//!
//! The file is a flat set of string tables, e.g.
//!
//! ```toml
//! [uv]
//! version = "0.8.2"
//! darwin_arm64 = "uv-aarch64-apple-darwin"
//! darwin_arm64_sha256 = "954d24634d5f37fa26c7af75eb79893d11623fc81b4de4b82d60d1ade4bfca22"
//! ```
//!
//! Lookups are explicit: a missing section or key surfaces as
//! [`ConfigError::MissingKey`] at the point the value is needed.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

/// Path of the config file relative to the repository root.
pub const CONFIG_RELATIVE_PATH: &str = "devenv/config.toml";

/// Errors reading the context or the repository configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read {}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parse {}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// A required `[section] key` is absent.
    #[error("missing config key {section}.{key}")]
    MissingKey { section: String, key: String },

    /// A required context entry is absent.
    #[error("missing context key {0}")]
    MissingContextKey(String),

    #[error("reporoot must be an absolute path, got {}", .0.display())]
    RelativeReporoot(PathBuf),
}

/// Per-repository configuration: section name -> key -> value.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct RepoConfig {
    sections: BTreeMap<String, BTreeMap<String, String>>,
}

/// The uv release pinned for one machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UvPin {
    pub version: String,
    /// Release asset name, e.g. `uv-aarch64-apple-darwin`, or a full
    /// archive URL.
    pub asset: String,
    /// Expected SHA-256 of the downloaded archive, hex encoded.
    pub sha256: String,
}

impl RepoConfig {
    pub fn from_toml_str(contents: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str(contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Look up `[section] key`.
    pub fn get(&self, section: &str, key: &str) -> Result<&str, ConfigError> {
        self.sections
            .get(section)
            .and_then(|table| table.get(key))
            .map(String::as_str)
            .ok_or_else(|| ConfigError::MissingKey {
                section: section.to_string(),
                key: key.to_string(),
            })
    }

    /// Resolve the uv pin for `machine` (`uv.version`, `uv.<machine>`,
    /// `uv.<machine>_sha256`). Keys are read in that order.
    pub fn uv_pin(&self, machine: &str) -> Result<UvPin, ConfigError> {
        let version = self.get("uv", "version")?.to_string();
        let asset = self.get("uv", machine)?.to_string();
        let sha256 = self.get("uv", &format!("{machine}_sha256"))?.to_string();
        Ok(UvPin {
            version,
            asset,
            sha256,
        })
    }
}

pub fn config_path(reporoot: &Path) -> PathBuf {
    reporoot.join(CONFIG_RELATIVE_PATH)
}

/// Load the configuration for the repository at `reporoot`.
///
/// Unlike optional tool settings, this file carries the pins every run needs,
/// so a missing file is an error.
pub fn load_repo_config(reporoot: &Path) -> Result<RepoConfig, ConfigError> {
    let path = config_path(reporoot);
    let contents = fs::read_to_string(&path).map_err(|source| ConfigError::Read {
        path: path.clone(),
        source,
    })?;
    let cfg = RepoConfig::from_toml_str(&contents, &path)?;
    debug!(path = %path.display(), sections = cfg.sections.len(), "loaded repo config");
    Ok(cfg)
}
