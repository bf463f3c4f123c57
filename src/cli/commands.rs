//! CLI command implementations

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::http_server::{HttpServer, StudentState};
use crate::observability::{log_event, log_event_with_fields, Event, MetricsRegistry};
use crate::store::{log_path, RecordStore, StoreError};

use super::args::Command;
use super::config::Config;
use super::errors::{CliError, CliResult};
use super::io::write_json;

/// Main CLI entry point
///
/// Parses arguments and dispatches to the appropriate command.
/// This is the only function that main.rs should call.
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    run_command(cli.command)
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Serve {
            config,
            port,
            data_dir,
        } => serve(config.as_deref(), port, data_dir),
        Command::Verify { data_dir } => verify(&data_dir),
    }
}

/// Open the store, then serve HTTP until Ctrl-C.
pub fn serve(config_path: Option<&Path>, port: Option<u16>, data_dir: Option<PathBuf>) -> CliResult<()> {
    log_event(Event::ServiceStartupBegin);

    let config = Config::load_or_default(config_path)?.with_overrides(port, data_dir)?;
    log_event_with_fields(
        Event::ConfigLoaded,
        &[
            ("addr", &config.http.socket_addr()),
            ("durable", &config.data_dir.is_some().to_string()),
        ],
    );

    let store = open_store(&config)?;
    let state = Arc::new(StudentState::new(
        Arc::new(store),
        Arc::new(MetricsRegistry::new()),
    ));
    let server = HttpServer::with_config(config.http, state);

    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| CliError::Serve(format!("Failed to create tokio runtime: {}", e)))?;

    rt.block_on(async {
        server
            .start()
            .await
            .map_err(|e| CliError::Serve(format!("HTTP server failed: {}", e)))
    })
}

/// Replay the mutation log without serving and print what it holds.
pub fn verify(data_dir: &Path) -> CliResult<()> {
    let path = log_path(data_dir);
    if !path.exists() {
        return Err(CliError::Config(format!(
            "No mutation log at {}",
            path.display()
        )));
    }

    let (_, summary) = RecordStore::replay(&path).map_err(store_failure)?;
    write_json(&summary)
}

fn open_store(config: &Config) -> CliResult<RecordStore> {
    match config.data_dir {
        Some(ref dir) => {
            RecordStore::open(dir, config.sync_writes).map_err(store_failure)
        }
        None => Ok(RecordStore::in_memory()),
    }
}

fn store_failure(err: StoreError) -> CliError {
    if err.is_fatal() {
        log_event_with_fields(Event::StoreCorruption, &[("error", &err.to_string())]);
    }
    CliError::from(err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::students::NewStudent;
    use tempfile::tempdir;

    #[test]
    fn test_verify_missing_log() {
        let dir = tempdir().unwrap();
        let err = verify(dir.path()).unwrap_err();
        assert_eq!(err.code(), "STUDENT_CLI_CONFIG_ERROR");
    }

    #[test]
    fn test_verify_existing_log() {
        let dir = tempdir().unwrap();
        {
            let store = RecordStore::open(dir.path(), true).unwrap();
            store
                .insert(NewStudent::new("Ana", "Lee", "ana@x.com", 20))
                .unwrap();
        }

        assert!(verify(dir.path()).is_ok());
    }

    #[test]
    fn test_open_store_in_memory_without_data_dir() {
        let store = open_store(&Config::default()).unwrap();
        assert!(!store.is_durable());
    }

    #[test]
    fn test_open_store_durable_with_data_dir() {
        let dir = tempdir().unwrap();
        let config = Config {
            data_dir: Some(dir.path().to_path_buf()),
            ..Default::default()
        };
        let store = open_store(&config).unwrap();
        assert!(store.is_durable());
    }
}
