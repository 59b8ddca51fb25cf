//! uv: pinned, hash-verified install into `<reporoot>/.devenv/bin`, and
//! frozen `uv sync`.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use sha2::{Digest, Sha256};
use tracing::{debug, info, instrument, warn};

use crate::context::SyncContext;
use crate::io::config::UvPin;
use crate::io::process::{CommandRunner, Invocation};
use crate::tools::curl_download;

pub const RELEASE_BASE_URL: &str = "https://github.com/astral-sh/uv/releases/download";

/// Binaries shipped in a uv release archive. Only `uv` is required.
const BINARIES: [&str; 2] = ["uv", "uvx"];

/// Download URL of the release archive for `pin`.
///
/// `pin.asset` is either a release asset name, resolved against the GitHub
/// release for `pin.version`, or already a full URL, used as is.
pub fn release_url(pin: &UvPin) -> String {
    if pin.asset.contains("://") {
        return pin.asset.clone();
    }
    format!("{RELEASE_BASE_URL}/{}/{}.tar.gz", pin.version, pin.asset)
}

/// Install `pin` into the repository-local tool directory.
///
/// A matching `uv --version` short-circuits the download. The archive digest
/// is checked before anything is extracted, so a mismatch leaves the existing
/// tool directory untouched.
#[instrument(skip_all, fields(version = %pin.version, asset = %pin.asset))]
pub fn install<R: CommandRunner>(runner: &R, pin: &UvPin, ctx: &SyncContext) -> Result<()> {
    let bin_dir = ctx.devenv_bin();
    let uv = bin_dir.join("uv");
    if installed_version(runner, &uv).as_deref() == Some(pin.version.as_str()) {
        info!("uv already at pinned version");
        return Ok(());
    }

    println!("installing uv {}...", pin.version);
    let devenv_dir = ctx.devenv_dir();
    fs::create_dir_all(&devenv_dir)
        .with_context(|| format!("create {}", devenv_dir.display()))?;
    let scratch = tempfile::Builder::new()
        .prefix("uv-")
        .tempdir_in(&devenv_dir)
        .with_context(|| format!("create scratch dir in {}", devenv_dir.display()))?;

    let archive = scratch.path().join("uv.tar.gz");
    runner
        .run(&curl_download(&release_url(pin), &archive))
        .context("download uv")?;
    verify_sha256(&archive, &pin.sha256)?;

    let unpacked = scratch.path().join("unpacked");
    fs::create_dir_all(&unpacked).with_context(|| format!("create {}", unpacked.display()))?;
    runner
        .run(&extract_invocation(&archive, &unpacked))
        .context("extract uv")?;

    fs::create_dir_all(&bin_dir).with_context(|| format!("create {}", bin_dir.display()))?;
    for name in BINARIES {
        let src = unpacked.join(name);
        if !src.exists() {
            if name == "uv" {
                bail!("uv archive {} has no uv binary", archive.display());
            }
            warn!(binary = name, "missing from uv archive");
            continue;
        }
        place_executable(&src, &bin_dir.join(name))?;
    }
    debug!(bin_dir = %bin_dir.display(), "uv installed");
    Ok(())
}

/// Version reported by `<uv> --version`, or `None` if uv is absent or broken.
pub fn installed_version<R: CommandRunner>(runner: &R, uv: &Path) -> Option<String> {
    if !uv.exists() {
        return None;
    }
    match runner.capture(&Invocation::new(uv).arg("--version")) {
        Ok(out) => parse_version(&out),
        Err(err) => {
            warn!(err = %err, "existing uv is not runnable, reinstalling");
            None
        }
    }
}

/// Parse `uv 0.8.2 (a1b2c3d 2025-07-22)` into `0.8.2`.
fn parse_version(output: &str) -> Option<String> {
    let mut parts = output.split_whitespace();
    match (parts.next(), parts.next()) {
        (Some("uv"), Some(version)) => Some(version.to_string()),
        _ => None,
    }
}

/// Check the SHA-256 of `path` against a hex digest (case-insensitive).
pub fn verify_sha256(path: &Path, expected: &str) -> Result<()> {
    let contents = fs::read(path).with_context(|| format!("read {}", path.display()))?;
    let mut hasher = Sha256::new();
    hasher.update(contents);
    let actual = hex::encode(hasher.finalize());
    if !actual.eq_ignore_ascii_case(expected.trim()) {
        bail!(
            "sha256 mismatch for {}: expected {}, got {}",
            path.display(),
            expected.trim(),
            actual
        );
    }
    Ok(())
}

fn extract_invocation(archive: &Path, dest: &Path) -> Invocation {
    Invocation::new("tar")
        .arg("-xzf")
        .path_arg(archive)
        .arg("-C")
        .path_arg(dest)
        .arg("--strip-components=1")
}

fn place_executable(src: &Path, dest: &Path) -> Result<()> {
    fs::rename(src, dest)
        .with_context(|| format!("move {} to {}", src.display(), dest.display()))?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(dest, fs::Permissions::from_mode(0o755))
            .with_context(|| format!("chmod {}", dest.display()))?;
    }
    Ok(())
}

/// Frozen, quiet `uv sync` targeting `<reporoot>/.venv`.
pub fn sync<R: CommandRunner>(runner: &R, ctx: &SyncContext) -> Result<()> {
    runner.run(&sync_invocation(ctx))
}

/// `--active` makes uv honour `VIRTUAL_ENV`, which is pinned to the repo venv.
pub fn sync_invocation(ctx: &SyncContext) -> Invocation {
    Invocation::new(ctx.devenv_bin().join("uv"))
        .args(["sync", "--frozen", "--quiet", "--active"])
        .current_dir(ctx.reporoot())
        .env("VIRTUAL_ENV", ctx.venv())
}
