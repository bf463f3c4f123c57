//! CLI argument definitions using clap
//!
//! Commands:
//! - student-directory serve [--config <path>] [--port <n>] [--data-dir <dir>]
//! - student-directory verify --data-dir <dir>

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Student directory - a small CRUD service over student records
#[derive(Parser, Debug)]
#[command(name = "student-directory")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Serve the HTTP API until Ctrl-C
    Serve {
        /// Path to a JSON configuration file (defaults apply when omitted)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Override the configured port
        #[arg(long)]
        port: Option<u16>,

        /// Override the configured data directory
        #[arg(long)]
        data_dir: Option<PathBuf>,
    },

    /// Replay and checksum the mutation log, then print a summary
    Verify {
        /// Data directory holding data/students.log
        #[arg(long)]
        data_dir: PathBuf,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
