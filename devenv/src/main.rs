//! `devenv`: bootstrap a local checkout for development.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use devenv::context::SyncContext;
use devenv::{exit_codes, logging, sync};

#[derive(Parser)]
#[command(
    name = "devenv",
    version,
    about = "Bootstrap a local checkout for development"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Install tools, sync `.venv`, and install pre-commit hooks.
    Sync {
        /// Repository root. Defaults to the current directory.
        #[arg(long, value_name = "PATH")]
        reporoot: Option<PathBuf>,
    },
}

fn main() {
    if let Err(err) = logging::init() {
        eprintln!("warning: {:#}", err);
    }
    match run() {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("{:#}", err);
            std::process::exit(exit_codes::for_error(&err));
        }
    }
}

fn run() -> Result<i32> {
    let cli = Cli::parse();
    match cli.command {
        Command::Sync { reporoot } => cmd_sync(reporoot),
    }
}

fn cmd_sync(reporoot: Option<PathBuf>) -> Result<i32> {
    let reporoot = match reporoot {
        Some(path) => path,
        None => std::env::current_dir().context("resolve current directory")?,
    };
    let reporoot = std::path::absolute(&reporoot)
        .with_context(|| format!("resolve {}", reporoot.display()))?;
    let ctx = SyncContext::new(reporoot)?;
    sync::sync_repo(&ctx)
}
