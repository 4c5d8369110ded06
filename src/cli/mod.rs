//! CLI module for bites
//!
//! Provides the command-line interface:
//! - serve: boot the store, provision it, and run the HTTP server

mod args;
mod commands;
mod errors;

pub use args::{Cli, Command};
pub use commands::{run_command, serve};
pub use errors::{CliError, CliResult};
