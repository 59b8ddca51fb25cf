//! Test-only fakes for the toolbox and process runner.

use std::cell::RefCell;
use std::path::{Path, PathBuf};

use anyhow::{Result, anyhow};

use crate::context::SyncContext;
use crate::io::config::{RepoConfig, UvPin};
use crate::io::process::{CommandRunner, Invocation};
use crate::sync::Step;
use crate::tools::Toolbox;

/// Machine id used by fixtures.
pub const TEST_MACHINE: &str = "darwin_arm64";

/// Config TOML pinning uv for [`TEST_MACHINE`].
pub const SAMPLE_CONFIG: &str = r#"[uv]
version = "0.8.2"
darwin_arm64 = "uv-aarch64-apple-darwin"
darwin_arm64_sha256 = "954d24634d5f37fa26c7af75eb79893d11623fc81b4de4b82d60d1ade4bfca22"
"#;

pub fn sample_config() -> RepoConfig {
    RepoConfig::from_toml_str(SAMPLE_CONFIG, Path::new("config.toml"))
        .expect("sample config parses")
}

/// One recorded [`Toolbox`] call with its arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolCall {
    EnsureBrew,
    BrewBundle { reporoot: PathBuf },
    GoInstall { module: String, version: String },
    InstallUv { pin: UvPin, reporoot: PathBuf },
    UvSync { reporoot: PathBuf },
    PreCommit { reporoot: PathBuf },
}

impl ToolCall {
    pub fn step(&self) -> Step {
        match self {
            ToolCall::EnsureBrew => Step::EnsureBrew,
            ToolCall::BrewBundle { .. } => Step::BrewBundle,
            ToolCall::GoInstall { .. } => Step::Goimports,
            ToolCall::InstallUv { .. } => Step::InstallUv,
            ToolCall::UvSync { .. } => Step::UvSync,
            ToolCall::PreCommit { .. } => Step::PreCommit,
        }
    }
}

/// Toolbox that records calls and optionally fails one step.
#[derive(Debug, Default)]
pub struct RecordingToolbox {
    calls: RefCell<Vec<ToolCall>>,
    fail_on: Option<Step>,
}

impl RecordingToolbox {
    pub fn failing_on(step: Step) -> Self {
        Self {
            fail_on: Some(step),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<ToolCall> {
        self.calls.borrow().clone()
    }

    pub fn steps(&self) -> Vec<Step> {
        self.calls.borrow().iter().map(ToolCall::step).collect()
    }

    fn record(&self, call: ToolCall) -> Result<()> {
        let step = call.step();
        self.calls.borrow_mut().push(call);
        if self.fail_on == Some(step) {
            return Err(anyhow!("scripted failure in {}", step.name()));
        }
        Ok(())
    }
}

impl Toolbox for RecordingToolbox {
    fn ensure_brew(&self) -> Result<()> {
        self.record(ToolCall::EnsureBrew)
    }

    fn brew_bundle(&self, reporoot: &Path) -> Result<()> {
        self.record(ToolCall::BrewBundle {
            reporoot: reporoot.to_path_buf(),
        })
    }

    fn install_go_tool(&self, module: &str, version: &str) -> Result<()> {
        self.record(ToolCall::GoInstall {
            module: module.to_string(),
            version: version.to_string(),
        })
    }

    fn install_uv(&self, pin: &UvPin, ctx: &SyncContext) -> Result<()> {
        self.record(ToolCall::InstallUv {
            pin: pin.clone(),
            reporoot: ctx.reporoot().to_path_buf(),
        })
    }

    fn uv_sync(&self, ctx: &SyncContext) -> Result<()> {
        self.record(ToolCall::UvSync {
            reporoot: ctx.reporoot().to_path_buf(),
        })
    }

    fn install_pre_commit_hooks(&self, ctx: &SyncContext) -> Result<()> {
        self.record(ToolCall::PreCommit {
            reporoot: ctx.reporoot().to_path_buf(),
        })
    }
}

/// Runner that records invocations instead of spawning them.
#[derive(Debug, Clone, Default)]
pub struct ScriptedRunner {
    invocations: RefCell<Vec<Invocation>>,
    fail_program: Option<String>,
    capture_output: String,
}

impl ScriptedRunner {
    /// Fail any invocation whose program ends with `program`.
    pub fn failing_on(program: &str) -> Self {
        Self {
            fail_program: Some(program.to_string()),
            ..Self::default()
        }
    }

    /// Return `output` from every `capture` call.
    pub fn with_capture(output: &str) -> Self {
        Self {
            capture_output: output.to_string(),
            ..Self::default()
        }
    }

    pub fn invocations(&self) -> Vec<Invocation> {
        self.invocations.borrow().clone()
    }

    fn record(&self, invocation: &Invocation) -> Result<()> {
        self.invocations.borrow_mut().push(invocation.clone());
        match &self.fail_program {
            Some(program) if invocation.program.ends_with(program) => {
                Err(anyhow!("{} failed with status Some(1)", invocation.command_line()))
            }
            _ => Ok(()),
        }
    }
}

impl CommandRunner for ScriptedRunner {
    fn run(&self, invocation: &Invocation) -> Result<()> {
        self.record(invocation)
    }

    fn capture(&self, invocation: &Invocation) -> Result<String> {
        self.record(invocation)?;
        Ok(self.capture_output.clone())
    }
}
