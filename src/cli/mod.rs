//! CLI module for devcamp
//!
//! Provides command-line interface for:
//! - start: Load seed data and serve the HTTP API
//! - query: One-shot list query against the seeded store

mod args;
mod commands;
mod config;
mod errors;

pub use args::{Cli, Command};
pub use commands::{query, run, run_command, start};
pub use config::Config;
pub use errors::{CliError, CliErrorCode, CliResult};
