//! Stable exit codes for `devenv` commands.

/// Every step completed.
pub const OK: i32 = 0;
/// A step failed: an external command exited non-zero, could not be spawned,
/// or a filesystem operation failed.
pub const FAILED: i32 = 1;
/// The context or repository configuration was missing, unreadable, or
/// lacked a required key.
pub const CONFIG: i32 = 2;

/// Map a failed run to its exit code.
pub fn for_error(err: &anyhow::Error) -> i32 {
    if err
        .chain()
        .any(|cause| cause.is::<crate::io::config::ConfigError>())
    {
        CONFIG
    } else {
        FAILED
    }
}
