//! I/O helpers: repository configuration and child processes.

pub mod config;
pub mod process;
