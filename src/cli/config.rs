//! Service configuration file
//!
//! Single JSON object, every field optional:
//!
//! ```json
//! {"host": "0.0.0.0", "port": 8080, "cors_origins": [], "data_dir": "./var", "sync_writes": true}
//! ```
//!
//! Without `data_dir` the directory lives in memory only.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::errors::{CliError, CliResult};
use crate::http_server::HttpServerConfig;

/// Configuration file structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(flatten)]
    pub http: HttpServerConfig,

    /// Root of durable state; absent means in-memory
    #[serde(default)]
    pub data_dir: Option<PathBuf>,

    /// fsync every log append (default: true)
    #[serde(default = "default_sync_writes")]
    pub sync_writes: bool,
}

fn default_sync_writes() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            http: HttpServerConfig::default(),
            data_dir: None,
            sync_writes: default_sync_writes(),
        }
    }
}

impl Config {
    /// Load and validate configuration from file
    pub fn load(path: &Path) -> CliResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            CliError::Config(format!("Failed to read config {}: {}", path.display(), e))
        })?;

        let config: Config = serde_json::from_str(&content)
            .map_err(|e| CliError::Config(format!("Invalid config JSON: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// File config if a path is given, defaults otherwise
    pub fn load_or_default(path: Option<&Path>) -> CliResult<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    /// Apply command-line overrides, then re-validate
    pub fn with_overrides(mut self, port: Option<u16>, data_dir: Option<PathBuf>) -> CliResult<Self> {
        if let Some(port) = port {
            self.http.port = port;
        }
        if data_dir.is_some() {
            self.data_dir = data_dir;
        }
        self.validate()?;
        Ok(self)
    }

    fn validate(&self) -> CliResult<()> {
        if self.http.port == 0 {
            return Err(CliError::Config("port must be > 0".into()));
        }

        if let Some(ref dir) = self.data_dir {
            if dir.as_os_str().is_empty() {
                return Err(CliError::Config("data_dir must not be empty".into()));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(json: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(json.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_empty_object_is_all_defaults() {
        let file = write_config("{}");
        let config = Config::load(file.path()).unwrap();
        assert_eq!(config, Config::default());
        assert!(config.sync_writes);
        assert!(config.data_dir.is_none());
    }

    #[test]
    fn test_flattened_http_fields() {
        let file = write_config(r#"{"port": 9000, "data_dir": "/var/students", "sync_writes": false}"#);
        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.http.port, 9000);
        assert_eq!(config.http.host, "0.0.0.0");
        assert_eq!(config.data_dir, Some(PathBuf::from("/var/students")));
        assert!(!config.sync_writes);
    }

    #[test]
    fn test_rejects_port_zero() {
        let file = write_config(r#"{"port": 0}"#);
        let err = Config::load(file.path()).unwrap_err();
        assert_eq!(err.code(), "STUDENT_CLI_CONFIG_ERROR");
    }

    #[test]
    fn test_rejects_empty_data_dir() {
        let file = write_config(r#"{"data_dir": ""}"#);
        assert!(Config::load(file.path()).is_err());
    }

    #[test]
    fn test_rejects_malformed_json() {
        let file = write_config("{port: ");
        assert!(Config::load(file.path()).is_err());
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Config::load(&dir.path().join("absent.json")).is_err());
    }

    #[test]
    fn test_overrides() {
        let config = Config::load_or_default(None)
            .unwrap()
            .with_overrides(Some(7000), Some(PathBuf::from("/data")))
            .unwrap();
        assert_eq!(config.http.port, 7000);
        assert_eq!(config.data_dir, Some(PathBuf::from("/data")));

        assert!(Config::default().with_overrides(Some(0), None).is_err());
    }
}
