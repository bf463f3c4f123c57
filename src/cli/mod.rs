//! CLI module for the student directory
//!
//! Provides command-line interface for:
//! - serve: open the store and serve the HTTP API
//! - verify: checksum and replay the mutation log offline

mod args;
mod commands;
mod config;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{run, run_command, serve, verify};
pub use config::Config;
pub use errors::{CliError, CliResult};
pub use io::{write_json, write_json_to};
