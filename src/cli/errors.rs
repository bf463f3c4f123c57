//! CLI-specific error types
//!
//! Every CLI error ends the process with status 1.

use std::io;

use thiserror::Error;

use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("STUDENT_CLI_CONFIG_ERROR: {0}")]
    Config(String),

    #[error("STUDENT_CLI_IO_ERROR: {0}")]
    Io(String),

    /// The record store could not be opened or verified
    #[error("STUDENT_CLI_STORE_OPEN_FAILED: {0}")]
    StoreOpen(#[from] StoreError),

    /// Runtime or listener failure while serving
    #[error("STUDENT_CLI_SERVE_FAILED: {0}")]
    Serve(String),
}

impl CliError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Config(_) => "STUDENT_CLI_CONFIG_ERROR",
            Self::Io(_) => "STUDENT_CLI_IO_ERROR",
            Self::StoreOpen(_) => "STUDENT_CLI_STORE_OPEN_FAILED",
            Self::Serve(_) => "STUDENT_CLI_SERVE_FAILED",
        }
    }
}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        Self::Io(e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        Self::Io(format!("JSON error: {}", e))
    }
}

pub type CliResult<T> = Result<T, CliError>;
