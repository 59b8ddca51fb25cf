//! `devenv sync`: the ordered bootstrap sequence.
//!
//! Six steps run in a fixed order. Each must succeed before the next starts;
//! the first failure aborts the run and is returned annotated with the step
//! name. Nothing is retried or rolled back.

use anyhow::{Context, Result};
use tracing::{info, instrument};

use crate::context::SyncContext;
use crate::exit_codes;
use crate::io::config::{RepoConfig, load_repo_config};
use crate::io::process::SystemRunner;
use crate::platform::Platform;
use crate::tools::go::{GOIMPORTS_MODULE, GOIMPORTS_VERSION};
use crate::tools::{SystemToolbox, Toolbox};

/// Bootstrap steps in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    EnsureBrew,
    BrewBundle,
    Goimports,
    InstallUv,
    UvSync,
    PreCommit,
}

impl Step {
    pub const ALL: [Step; 6] = [
        Step::EnsureBrew,
        Step::BrewBundle,
        Step::Goimports,
        Step::InstallUv,
        Step::UvSync,
        Step::PreCommit,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Step::EnsureBrew => "ensure-brew",
            Step::BrewBundle => "brew-bundle",
            Step::Goimports => "goimports",
            Step::InstallUv => "install-uv",
            Step::UvSync => "uv-sync",
            Step::PreCommit => "pre-commit",
        }
    }

    /// Line printed to stdout before the step runs, if any.
    fn progress(self) -> Option<&'static str> {
        match self {
            Step::Goimports => Some("installing goimports..."),
            Step::UvSync => Some("syncing .venv ..."),
            Step::PreCommit => Some("installing pre-commit hooks ..."),
            _ => None,
        }
    }
}

/// Bootstrap the repository in `ctx` with the real toolchain.
///
/// Loads `devenv/config.toml` from the repository root, then runs every step.
pub fn sync_repo(ctx: &SyncContext) -> Result<i32> {
    let cfg = load_repo_config(ctx.reporoot())?;
    let platform = Platform::current();
    let toolbox = SystemToolbox::new(SystemRunner, platform.homebrew_prefix());
    run_sync(ctx, &cfg, &platform, &toolbox)
}

/// Run all steps in order against `toolbox`. Returns [`exit_codes::OK`] once
/// every step has succeeded.
#[instrument(skip_all, fields(reporoot = %ctx.reporoot().display(), machine = %platform.machine()))]
pub fn run_sync<T: Toolbox>(
    ctx: &SyncContext,
    cfg: &RepoConfig,
    platform: &Platform,
    toolbox: &T,
) -> Result<i32> {
    for step in Step::ALL {
        if let Some(line) = step.progress() {
            println!("{line}");
        }
        run_step(step, ctx, cfg, platform, toolbox)
            .with_context(|| format!("step {} failed", step.name()))?;
        info!(step = step.name(), "step completed");
    }
    Ok(exit_codes::OK)
}

fn run_step<T: Toolbox>(
    step: Step,
    ctx: &SyncContext,
    cfg: &RepoConfig,
    platform: &Platform,
    toolbox: &T,
) -> Result<()> {
    match step {
        Step::EnsureBrew => toolbox.ensure_brew(),
        Step::BrewBundle => toolbox.brew_bundle(ctx.reporoot()),
        Step::Goimports => toolbox.install_go_tool(GOIMPORTS_MODULE, GOIMPORTS_VERSION),
        Step::InstallUv => {
            let pin = cfg.uv_pin(&platform.machine())?;
            toolbox.install_uv(&pin, ctx)
        }
        Step::UvSync => toolbox.uv_sync(ctx),
        Step::PreCommit => toolbox.install_pre_commit_hooks(ctx),
    }
}

#[cfg(test)]
mod tests {
    use std::path::{Path, PathBuf};

    use super::*;
    use crate::io::config::{ConfigError, UvPin};
    use crate::test_support::{RecordingToolbox, ToolCall, sample_config};

    fn ctx() -> SyncContext {
        SyncContext::new("/tmp/repo").expect("context")
    }

    fn platform() -> Platform {
        Platform::new("darwin", "arm64")
    }

    #[test]
    fn progress_lines_match_steps() {
        let lines: Vec<(Step, Option<&str>)> =
            Step::ALL.iter().map(|step| (*step, step.progress())).collect();
        assert_eq!(
            lines,
            vec![
                (Step::EnsureBrew, None),
                (Step::BrewBundle, None),
                (Step::Goimports, Some("installing goimports...")),
                (Step::InstallUv, None),
                (Step::UvSync, Some("syncing .venv ...")),
                (Step::PreCommit, Some("installing pre-commit hooks ...")),
            ]
        );
    }

    #[test]
    fn all_steps_succeed_returns_ok() {
        let toolbox = RecordingToolbox::default();
        let code = run_sync(&ctx(), &sample_config(), &platform(), &toolbox).expect("sync");
        assert_eq!(code, exit_codes::OK);
        assert_eq!(toolbox.steps(), Step::ALL.to_vec());
    }

    #[test]
    fn failing_step_stops_the_sequence() {
        for (index, step) in Step::ALL.iter().copied().enumerate() {
            let toolbox = RecordingToolbox::failing_on(step);
            let err = run_sync(&ctx(), &sample_config(), &platform(), &toolbox)
                .expect_err("scripted failure");
            assert_eq!(toolbox.steps(), Step::ALL[..=index].to_vec());
            assert!(
                err.to_string().contains(step.name()),
                "error should name {}: {err:#}",
                step.name()
            );
        }
    }

    #[test]
    fn install_uv_receives_pin_from_config() {
        let toolbox = RecordingToolbox::default();
        run_sync(&ctx(), &sample_config(), &platform(), &toolbox).expect("sync");
        let install = toolbox
            .calls()
            .into_iter()
            .find(|call| call.step() == Step::InstallUv)
            .expect("install-uv call");
        assert_eq!(
            install,
            ToolCall::InstallUv {
                pin: UvPin {
                    version: "0.8.2".to_string(),
                    asset: "uv-aarch64-apple-darwin".to_string(),
                    sha256: "954d24634d5f37fa26c7af75eb79893d11623fc81b4de4b82d60d1ade4bfca22"
                        .to_string(),
                },
                reporoot: PathBuf::from("/tmp/repo"),
            }
        );
    }

    #[test]
    fn goimports_is_pinned() {
        let toolbox = RecordingToolbox::default();
        run_sync(&ctx(), &sample_config(), &platform(), &toolbox).expect("sync");
        assert!(toolbox.calls().contains(&ToolCall::GoInstall {
            module: "golang.org/x/tools/cmd/goimports".to_string(),
            version: "v0.36.0".to_string(),
        }));
    }

    #[test]
    fn brew_bundle_runs_in_reporoot() {
        let toolbox = RecordingToolbox::default();
        run_sync(&ctx(), &sample_config(), &platform(), &toolbox).expect("sync");
        assert_eq!(
            toolbox.calls()[1],
            ToolCall::BrewBundle {
                reporoot: Path::new("/tmp/repo").to_path_buf()
            }
        );
    }

    #[test]
    fn missing_uv_version_fails_before_install_uv() {
        let cfg = RepoConfig::from_toml_str(
            "[uv]\ndarwin_arm64 = \"uv-aarch64-apple-darwin\"\ndarwin_arm64_sha256 = \"abc\"\n",
            Path::new("config.toml"),
        )
        .expect("parse");
        let toolbox = RecordingToolbox::default();

        let err = run_sync(&ctx(), &cfg, &platform(), &toolbox).expect_err("missing version");

        assert_eq!(
            toolbox.steps(),
            vec![Step::EnsureBrew, Step::BrewBundle, Step::Goimports]
        );
        let config_err = err.downcast_ref::<ConfigError>().expect("config error");
        assert!(matches!(
            config_err,
            ConfigError::MissingKey { section, key } if section == "uv" && key == "version"
        ));
    }

    #[test]
    fn unpinned_machine_fails_before_install_uv() {
        let toolbox = RecordingToolbox::default();
        let linux = Platform::new("linux", "x86_64");
        let err = run_sync(&ctx(), &sample_config(), &linux, &toolbox).expect_err("no pin");
        assert!(format!("{err:#}").contains("missing config key uv.linux_x86_64"));
        assert!(!toolbox.steps().contains(&Step::InstallUv));
    }
}
