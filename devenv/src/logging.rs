//! Diagnostic tracing for `devenv` runs.
//!
//! Progress lines (`installing goimports...`) are product output and go to
//! stdout unconditionally. Tracing is for debugging the bootstrap itself: it is
//! controlled by `RUST_LOG` and written to stderr.

use anyhow::{Context, Result};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Filter used when `RUST_LOG` is unset or unparsable.
pub const DEFAULT_DIRECTIVE: &str = "warn";

/// Install the global tracing subscriber.
///
/// Fails if a subscriber is already installed; the caller decides whether
/// that matters.
///
/// # Example
/// ```bash
/// RUST_LOG=devenv=debug devenv sync
/// ```
pub fn init() -> Result<()> {
    tracing_subscriber::registry()
        .with(env_filter())
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .try_init()
        .context("install tracing subscriber")
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE))
}
