//! Git hook installation via the virtualenv's `pre-commit`.

use anyhow::Result;

use crate::context::SyncContext;
use crate::io::process::{CommandRunner, Invocation};

pub fn install_hooks<R: CommandRunner>(runner: &R, ctx: &SyncContext) -> Result<()> {
    runner.run(&install_hooks_invocation(ctx))
}

pub fn install_hooks_invocation(ctx: &SyncContext) -> Invocation {
    Invocation::new(ctx.venv_bin().join("pre-commit"))
        .args(["install", "--install-hooks"])
        .current_dir(ctx.reporoot())
}
