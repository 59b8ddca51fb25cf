//! Host machine identification.
//!
//! The machine id (`<os>_<arch>`) selects the per-machine keys in the repo
//! config, and also decides where Homebrew lives.

use std::path::{Path, PathBuf};

/// Host operating system and architecture, in the naming used by config keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Platform {
    os: String,
    arch: String,
}

impl Platform {
    pub fn new(os: impl Into<String>, arch: impl Into<String>) -> Self {
        Self {
            os: os.into(),
            arch: arch.into(),
        }
    }

    /// Detect the running machine.
    ///
    /// Rust's `macos`/`aarch64` are reported as `darwin`/`arm64`.
    pub fn current() -> Self {
        let os = match std::env::consts::OS {
            "macos" => "darwin",
            other => other,
        };
        let arch = match std::env::consts::ARCH {
            "aarch64" => "arm64",
            other => other,
        };
        Self::new(os, arch)
    }

    /// Config key identifying this machine, e.g. `darwin_arm64`.
    pub fn machine(&self) -> String {
        format!("{}_{}", self.os, self.arch)
    }

    /// Homebrew installation prefix for this machine.
    pub fn homebrew_prefix(&self) -> PathBuf {
        match (self.os.as_str(), self.arch.as_str()) {
            ("darwin", "arm64") => PathBuf::from("/opt/homebrew"),
            ("darwin", _) => PathBuf::from("/usr/local"),
            _ => PathBuf::from("/home/linuxbrew/.linuxbrew"),
        }
    }
}

/// Path of the `brew` executable under `prefix`.
pub fn brew_bin(prefix: &Path) -> PathBuf {
    prefix.join("bin").join("brew")
}
