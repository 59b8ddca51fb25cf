//! Developer-environment bootstrap.
//!
//! `devenv sync` prepares a checkout for development by driving external
//! tools in a fixed order: Homebrew, `brew bundle`, `go install`, a pinned and
//! hash-verified uv, a frozen `uv sync`, and `pre-commit install`.
//!
//! - **[`sync`]**: the step sequence. Generic over [`tools::Toolbox`] so the
//!   ordering and failure semantics are testable without spawning processes.
//! - **[`tools`]**: one adapter per external tool, issuing commands through
//!   [`io::process::CommandRunner`].
//! - **[`io`]**: repository configuration and child-process execution.

pub mod context;
pub mod exit_codes;
pub mod io;
pub mod logging;
pub mod platform;
pub mod sync;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
pub mod tools;
