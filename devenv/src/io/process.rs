//! Blocking child-process execution.
//!
//! Every external tool the bootstrap touches goes through [`CommandRunner`], so
//! tests can script outcomes without spawning anything.

use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use anyhow::{Context, Result, anyhow};
use tracing::{debug, error, instrument, warn};

/// A fully described external command.
///
/// Arguments and environment values are kept as `OsString` so paths reach the
/// child byte-for-byte; only [`Invocation::command_line`] is lossy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: PathBuf,
    pub args: Vec<OsString>,
    /// Working directory; inherited from the parent when `None`.
    pub cwd: Option<PathBuf>,
    /// Extra environment variables layered over the parent's.
    pub env: Vec<(OsString, OsString)>,
}

impl Invocation {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: None,
            env: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_os_string());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args
            .extend(args.into_iter().map(|arg| arg.as_ref().to_os_string()));
        self
    }

    /// Append a path argument.
    pub fn path_arg(self, path: &Path) -> Self {
        self.arg(path.as_os_str())
    }

    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    pub fn env(mut self, key: impl AsRef<OsStr>, value: impl AsRef<OsStr>) -> Self {
        self.env
            .push((key.as_ref().to_os_string(), value.as_ref().to_os_string()));
        self
    }

    /// Value of an environment override, if set.
    pub fn env_value(&self, key: &str) -> Option<&OsStr> {
        self.env
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_os_str())
    }

    /// Shell-like rendering for logs and error messages.
    pub fn command_line(&self) -> String {
        let mut line = self.program.display().to_string();
        for arg in &self.args {
            line.push(' ');
            line.push_str(&arg.to_string_lossy());
        }
        line
    }

    fn to_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        if let Some(dir) = &self.cwd {
            cmd.current_dir(dir);
        }
        for (key, value) in &self.env {
            cmd.env(key, value);
        }
        cmd
    }
}

/// Executes external commands to completion.
pub trait CommandRunner {
    /// Run with inherited stdio. Errors if the command cannot be spawned or
    /// exits non-zero.
    fn run(&self, invocation: &Invocation) -> Result<()>;

    /// Run and return stdout. Errors if the command cannot be spawned or
    /// exits non-zero.
    fn capture(&self, invocation: &Invocation) -> Result<String>;
}

/// Runner that spawns real processes and blocks until they exit.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    #[instrument(skip_all, fields(program = %invocation.program.display()))]
    fn run(&self, invocation: &Invocation) -> Result<()> {
        debug!(command = %invocation.command_line(), cwd = ?invocation.cwd, "spawning child process");
        let mut cmd = invocation.to_command();
        cmd.stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());
        let status = match cmd.status() {
            Ok(status) => status,
            Err(e) => {
                error!(err = %e, "failed to spawn command");
                return Err(e).with_context(|| format!("spawn {}", invocation.command_line()));
            }
        };

        if !status.success() {
            warn!(exit_code = ?status.code(), "command failed");
            return Err(anyhow!(
                "{} failed with status {:?}",
                invocation.command_line(),
                status.code()
            ));
        }
        debug!("command finished");
        Ok(())
    }

    #[instrument(skip_all, fields(program = %invocation.program.display()))]
    fn capture(&self, invocation: &Invocation) -> Result<String> {
        debug!(command = %invocation.command_line(), "spawning child process (captured)");
        let output = invocation
            .to_command()
            .stdin(Stdio::null())
            .output()
            .with_context(|| format!("spawn {}", invocation.command_line()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            warn!(exit_code = ?output.status.code(), "command failed");
            return Err(anyhow!(
                "{} failed: {}",
                invocation.command_line(),
                stderr.trim()
            ));
        }
        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }
}
