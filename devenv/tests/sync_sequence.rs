//! End-to-end sequencing through the real `SystemToolbox` with a scripted
//! process runner.

use std::fs;
use std::path::Path;

use devenv::context::SyncContext;
use devenv::exit_codes;
use devenv::io::config::load_repo_config;
use devenv::platform::{Platform, brew_bin};
use devenv::sync::run_sync;
use devenv::test_support::{SAMPLE_CONFIG, ScriptedRunner};
use devenv::tools::SystemToolbox;

/// Repository with config and an already-installed uv at the pinned version,
/// plus a Homebrew prefix that already has `brew`.
fn prepared_repo(root: &Path) -> (SyncContext, std::path::PathBuf) {
    let reporoot = root.join("repo");
    fs::create_dir_all(reporoot.join("devenv")).expect("mkdir devenv");
    fs::write(reporoot.join("devenv/config.toml"), SAMPLE_CONFIG).expect("write config");
    let ctx = SyncContext::new(&reporoot).expect("context");
    fs::create_dir_all(ctx.devenv_bin()).expect("mkdir bin");
    fs::write(ctx.devenv_bin().join("uv"), "").expect("write uv");

    let prefix = root.join("homebrew");
    let brew = brew_bin(&prefix);
    fs::create_dir_all(brew.parent().expect("parent")).expect("mkdir brew");
    fs::write(&brew, "").expect("write brew");
    (ctx, prefix)
}

#[test]
fn sync_issues_commands_in_order() {
    let temp = tempfile::tempdir().expect("tempdir");
    let (ctx, prefix) = prepared_repo(temp.path());
    let cfg = load_repo_config(ctx.reporoot()).expect("config");
    let toolbox = SystemToolbox::new(
        ScriptedRunner::with_capture("uv 0.8.2 (a1b2c3d 2025-07-22)\n"),
        &prefix,
    );

    let code = run_sync(&ctx, &cfg, &Platform::new("darwin", "arm64"), &toolbox).expect("sync");

    assert_eq!(code, exit_codes::OK);
    let lines: Vec<String> = toolbox
        .runner()
        .invocations()
        .iter()
        .map(|inv| inv.command_line())
        .collect();
    let root = ctx.reporoot().display().to_string();
    assert_eq!(
        lines,
        vec![
            format!("{}/bin/brew bundle", prefix.display()),
            "go install golang.org/x/tools/cmd/goimports@v0.36.0".to_string(),
            format!("{root}/.devenv/bin/uv --version"),
            format!("{root}/.devenv/bin/uv sync --frozen --quiet --active"),
            format!("{root}/.venv/bin/pre-commit install --install-hooks"),
        ]
    );
}

#[test]
fn failing_go_install_skips_later_commands() {
    let temp = tempfile::tempdir().expect("tempdir");
    let (ctx, prefix) = prepared_repo(temp.path());
    let cfg = load_repo_config(ctx.reporoot()).expect("config");
    let toolbox = SystemToolbox::new(ScriptedRunner::failing_on("go"), &prefix);

    let err = run_sync(&ctx, &cfg, &Platform::new("darwin", "arm64"), &toolbox)
        .expect_err("go fails");

    assert_eq!(exit_codes::for_error(&err), exit_codes::FAILED);
    let programs: Vec<String> = toolbox
        .runner()
        .invocations()
        .iter()
        .map(|inv| inv.program.display().to_string())
        .collect();
    assert_eq!(programs.last().map(String::as_str), Some("go"));
    assert_eq!(programs.len(), 2);
}
