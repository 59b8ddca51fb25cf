//! Homebrew: presence check, installer, and `brew bundle`.

use std::path::Path;

use anyhow::{Context, Result, bail};
use tracing::{debug, info, instrument};

use crate::io::process::{CommandRunner, Invocation};
use crate::platform::brew_bin;
use crate::tools::curl_download;

pub const INSTALL_SCRIPT_URL: &str =
    "https://raw.githubusercontent.com/Homebrew/install/HEAD/install.sh";

/// Install Homebrew under `prefix` unless `<prefix>/bin/brew` already exists.
///
/// The official install script is fetched with `curl` and run with `bash` in
/// non-interactive mode.
#[instrument(skip_all, fields(prefix = %prefix.display()))]
pub fn ensure_installed<R: CommandRunner>(runner: &R, prefix: &Path) -> Result<()> {
    let brew = brew_bin(prefix);
    if brew.exists() {
        debug!(brew = %brew.display(), "homebrew already installed");
        return Ok(());
    }

    println!("installing homebrew...");
    info!("homebrew missing, running installer");
    let scratch = tempfile::tempdir().context("create scratch dir for homebrew installer")?;
    let script = scratch.path().join("install.sh");
    runner
        .run(&curl_download(INSTALL_SCRIPT_URL, &script))
        .context("download homebrew installer")?;
    runner
        .run(
            &Invocation::new("/bin/bash")
                .path_arg(&script)
                .env("NONINTERACTIVE", "1"),
        )
        .context("run homebrew installer")?;

    if !brew.exists() {
        bail!(
            "homebrew installer finished but {} is missing",
            brew.display()
        );
    }
    Ok(())
}

/// Install everything in the repository's `Brewfile`.
pub fn bundle<R: CommandRunner>(runner: &R, prefix: &Path, reporoot: &Path) -> Result<()> {
    runner.run(
        &Invocation::new(brew_bin(prefix))
            .arg("bundle")
            .current_dir(reporoot),
    )
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::fs;

    use super::*;
    use crate::test_support::ScriptedRunner;

    #[test]
    fn present_brew_runs_nothing() {
        let temp = tempfile::tempdir().expect("tempdir");
        let brew = brew_bin(temp.path());
        fs::create_dir_all(brew.parent().expect("parent")).expect("mkdir");
        fs::write(&brew, "").expect("write brew");

        let runner = ScriptedRunner::default();
        ensure_installed(&runner, temp.path()).expect("ensure");
        assert!(runner.invocations().is_empty());
    }

    /// Runner that materializes `brew` when the installer script runs.
    struct InstallingRunner {
        brew: std::path::PathBuf,
        programs: RefCell<Vec<String>>,
    }

    impl CommandRunner for InstallingRunner {
        fn run(&self, invocation: &Invocation) -> Result<()> {
            let program = invocation.program.display().to_string();
            if program == "/bin/bash" {
                assert_eq!(
                    invocation.env_value("NONINTERACTIVE"),
                    Some(std::ffi::OsStr::new("1"))
                );
                fs::create_dir_all(self.brew.parent().expect("parent")).expect("mkdir");
                fs::write(&self.brew, "").expect("write brew");
            }
            self.programs.borrow_mut().push(program);
            Ok(())
        }

        fn capture(&self, _invocation: &Invocation) -> Result<String> {
            Ok(String::new())
        }
    }

    #[test]
    fn missing_brew_downloads_and_runs_installer() {
        let temp = tempfile::tempdir().expect("tempdir");
        let runner = InstallingRunner {
            brew: brew_bin(temp.path()),
            programs: RefCell::new(Vec::new()),
        };
        ensure_installed(&runner, temp.path()).expect("ensure");
        assert_eq!(*runner.programs.borrow(), vec!["curl", "/bin/bash"]);
    }

    #[test]
    fn installer_without_brew_is_an_error() {
        let temp = tempfile::tempdir().expect("tempdir");
        let runner = ScriptedRunner::default();
        let err = ensure_installed(&runner, temp.path()).expect_err("no brew");
        assert!(err.to_string().contains("is missing"));
    }

    #[test]
    fn failed_download_skips_installer() {
        let temp = tempfile::tempdir().expect("tempdir");
        let runner = ScriptedRunner::failing_on("curl");
        let err = ensure_installed(&runner, temp.path()).expect_err("curl fails");
        assert!(format!("{err:#}").contains("download homebrew installer"));
        assert_eq!(runner.invocations().len(), 1);
    }
}
