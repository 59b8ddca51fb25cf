//! Go toolchain installs.

use anyhow::{Context, Result};
use tracing::instrument;

use crate::io::process::{CommandRunner, Invocation};

pub const GOIMPORTS_MODULE: &str = "golang.org/x/tools/cmd/goimports";
pub const GOIMPORTS_VERSION: &str = "v0.36.0";

/// `go install <module>@<version>`.
#[instrument(skip(runner))]
pub fn install<R: CommandRunner>(runner: &R, module: &str, version: &str) -> Result<()> {
    runner
        .run(&install_invocation(module, version))
        .with_context(|| format!("install {module}@{version}"))
}

pub fn install_invocation(module: &str, version: &str) -> Invocation {
    Invocation::new("go")
        .arg("install")
        .arg(format!("{module}@{version}"))
}
