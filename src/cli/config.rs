//! Configuration file
//!
//! ```json
//! {
//!   "server": { "host": "0.0.0.0", "port": 5000, "cors_origins": [] },
//!   "seed_file": "./seed.json",
//!   "log_level": "info"
//! }
//! ```
//!
//! Every field is optional. A missing file yields the defaults.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::http_server::HttpServerConfig;
use crate::observability::Severity;
use crate::rest_api::DocumentStore;

use super::errors::{CliError, CliResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// HTTP listener settings
    #[serde(default)]
    pub server: HttpServerConfig,

    /// JSON object of `{ "<collection>": [documents] }` imported at boot
    #[serde(default)]
    pub seed_file: Option<PathBuf>,

    /// Minimum log severity (trace, info, warn, error, fatal)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: HttpServerConfig::default(),
            seed_file: None,
            log_level: default_log_level(),
        }
    }
}

impl Config {
    /// Load configuration from file
    pub fn load(path: &Path) -> CliResult<Self> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => {
                return Err(CliError::config_error(format!(
                    "Failed to read config {:?}: {}",
                    path, e
                )))
            }
        };

        let config: Config = serde_json::from_str(&content)
            .map_err(|e| CliError::config_error(format!("Invalid config JSON: {}", e)))?;

        config.validate()?;

        Ok(config)
    }

    fn validate(&self) -> CliResult<()> {
        self.severity()?;
        Ok(())
    }

    /// Parsed `log_level`
    pub fn severity(&self) -> CliResult<Severity> {
        self.log_level
            .parse()
            .map_err(|e: String| CliError::config_error(e))
    }

    /// Build the document store, importing the seed file if one is set.
    ///
    /// Returns the store and the number of imported documents.
    pub fn open_store(&self) -> CliResult<(Arc<DocumentStore>, usize)> {
        let store = Arc::new(DocumentStore::new());

        let path = match &self.seed_file {
            Some(path) => path,
            None => return Ok((store, 0)),
        };

        let content = fs::read_to_string(path)
            .map_err(|e| CliError::seed_error(format!("Failed to read seed {:?}: {}", path, e)))?;
        let seed: Value = serde_json::from_str(&content)
            .map_err(|e| CliError::seed_error(format!("Invalid seed JSON: {}", e)))?;
        let imported = store
            .import(&seed)
            .map_err(|e| CliError::seed_error(e.to_string()))?;

        Ok((store, imported))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_temp(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(&dir.path().join("absent.json")).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.server.port, 5000);
    }

    #[test]
    fn test_partial_config() {
        let file = write_temp(r#"{"server": {"port": 3000}, "log_level": "warn"}"#);
        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.severity().unwrap(), Severity::Warn);
    }

    #[test]
    fn test_invalid_json_rejected() {
        let file = write_temp("{ server: ");
        let err = Config::load(file.path()).unwrap_err();
        assert_eq!(err.code_str(), "DEVCAMP_CLI_CONFIG_ERROR");
    }

    #[test]
    fn test_unknown_log_level_rejected() {
        let file = write_temp(r#"{"log_level": "chatty"}"#);
        assert!(Config::load(file.path()).is_err());
    }

    #[test]
    fn test_open_store_imports_seed() {
        let seed = write_temp(r#"{"bootcamps": [{"name": "Devworks"}, {"name": "ModernTech"}]}"#);
        let config = Config {
            seed_file: Some(seed.path().to_path_buf()),
            ..Default::default()
        };

        let (store, imported) = config.open_store().unwrap();
        assert_eq!(imported, 2);
        assert_eq!(store.len("bootcamps").unwrap(), 2);
    }

    #[test]
    fn test_open_store_missing_seed() {
        let config = Config {
            seed_file: Some(PathBuf::from("/nonexistent/seed.json")),
            ..Default::default()
        };
        assert_eq!(
            config.open_store().unwrap_err().code(),
            &super::super::errors::CliErrorCode::SeedError
        );
    }
}
