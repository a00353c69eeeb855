//! Fluent API for building test configurations
//!
//! Provides a builder pattern for creating client configurations with sensible
//! defaults, written out as TOML so they go through the real loader.

use backupchan_client::config::{
    Config, ConnectionConfig, LoggingSettings, UploadConfig,
};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// Builder for creating test configurations
pub struct ConfigBuilder {
    temp_dir: TempDir,
    connection: ConnectionConfig,
    logging: LoggingSettings,
    upload: UploadConfig,
}

impl ConfigBuilder {
    /// Create a new ConfigBuilder pointing at a local server
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");

        Self {
            temp_dir,
            connection: ConnectionConfig {
                host: "localhost".to_string(),
                port: 5050,
                api_key: "test-key".to_string(),
                timeout_seconds: None,
            },
            logging: LoggingSettings::default(),
            upload: UploadConfig::default(),
        }
    }

    pub fn host(mut self, host: &str) -> Self {
        self.connection.host = host.to_string();
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.connection.port = port;
        self
    }

    pub fn api_key(mut self, api_key: &str) -> Self {
        self.connection.api_key = api_key.to_string();
        self
    }

    pub fn timeout_seconds(mut self, seconds: u64) -> Self {
        self.connection.timeout_seconds = Some(seconds);
        self
    }

    /// Log into a `logs` directory inside the builder's temp dir
    pub fn with_log_directory(mut self) -> Self {
        let log_directory = self.temp_dir.path().join("logs");
        fs::create_dir_all(&log_directory).expect("Failed to create log directory");
        self.logging.log_directory = Some(log_directory);
        self
    }

    /// Stage archives in an `archives` directory inside the builder's temp dir
    pub fn with_archive_dir(mut self) -> Self {
        let archive_dir = self.temp_dir.path().join("archives");
        fs::create_dir_all(&archive_dir).expect("Failed to create archive directory");
        self.upload.archive_dir = Some(archive_dir);
        self
    }

    /// Build the config
    pub fn build(self) -> Config {
        self.persist().0
    }

    /// Build the config and keep the temp dir alive
    pub fn persist(self) -> (Config, TempDir) {
        let config = Config {
            connection: self.connection,
            logging: self.logging,
            upload: self.upload,
        };
        (config, self.temp_dir)
    }

    /// Write the config as `config.toml` and return its path with the temp dir
    pub fn write(self) -> (PathBuf, TempDir) {
        let (config, temp_dir) = self.persist();
        let path = temp_dir.path().join("config.toml");
        let toml_str = toml::to_string_pretty(&config).expect("Failed to serialize config");
        fs::write(&path, toml_str).expect("Failed to write config");
        (path, temp_dir)
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
