//! Adapters for the external tools the bootstrap drives.
//!
//! [`Toolbox`] has one method per bootstrap step. [`SystemToolbox`] implements
//! it by issuing commands through a [`CommandRunner`]; tests substitute a
//! recording toolbox or a scripted runner.

pub mod brew;
pub mod go;
pub mod precommit;
pub mod uv;

use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::context::SyncContext;
use crate::io::config::UvPin;
use crate::io::process::{CommandRunner, Invocation, SystemRunner};

/// Operations behind each bootstrap step.
pub trait Toolbox {
    /// Make sure Homebrew is installed, installing it if absent.
    fn ensure_brew(&self) -> Result<()>;
    /// `brew bundle` in the repository root.
    fn brew_bundle(&self, reporoot: &Path) -> Result<()>;
    /// `go install <module>@<version>`.
    fn install_go_tool(&self, module: &str, version: &str) -> Result<()>;
    /// Install the pinned uv release into `<reporoot>/.devenv/bin`.
    fn install_uv(&self, pin: &UvPin, ctx: &SyncContext) -> Result<()>;
    /// Frozen `uv sync` into `<reporoot>/.venv`.
    fn uv_sync(&self, ctx: &SyncContext) -> Result<()>;
    /// `pre-commit install` from the repository virtualenv.
    fn install_pre_commit_hooks(&self, ctx: &SyncContext) -> Result<()>;
}

/// Toolbox backed by real (or scripted) processes.
#[derive(Debug, Clone)]
pub struct SystemToolbox<R: CommandRunner = SystemRunner> {
    runner: R,
    homebrew_prefix: PathBuf,
}

impl<R: CommandRunner> SystemToolbox<R> {
    pub fn new(runner: R, homebrew_prefix: impl Into<PathBuf>) -> Self {
        Self {
            runner,
            homebrew_prefix: homebrew_prefix.into(),
        }
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }
}

impl<R: CommandRunner> Toolbox for SystemToolbox<R> {
    fn ensure_brew(&self) -> Result<()> {
        brew::ensure_installed(&self.runner, &self.homebrew_prefix)
    }

    fn brew_bundle(&self, reporoot: &Path) -> Result<()> {
        brew::bundle(&self.runner, &self.homebrew_prefix, reporoot)
    }

    fn install_go_tool(&self, module: &str, version: &str) -> Result<()> {
        go::install(&self.runner, module, version)
    }

    fn install_uv(&self, pin: &UvPin, ctx: &SyncContext) -> Result<()> {
        uv::install(&self.runner, pin, ctx)
    }

    fn uv_sync(&self, ctx: &SyncContext) -> Result<()> {
        uv::sync(&self.runner, ctx)
    }

    fn install_pre_commit_hooks(&self, ctx: &SyncContext) -> Result<()> {
        precommit::install_hooks(&self.runner, ctx)
    }
}

/// `curl` invocation that downloads `url` to `dest`, failing on HTTP errors.
pub fn curl_download(url: &str, dest: &Path) -> Invocation {
    Invocation::new("curl")
        .args(["--fail", "--silent", "--show-error", "--location"])
        .arg("--output")
        .path_arg(dest)
        .arg(url)
}
