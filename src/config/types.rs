use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub connection: ConnectionConfig,
    #[serde(default)]
    pub logging: LoggingSettings,
    #[serde(default)]
    pub upload: UploadConfig,
}

/// Where the server lives and how to authenticate
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ConnectionConfig {
    /// Host name, optionally with a scheme (`https://backups.lan`)
    pub host: String,
    pub port: u16,
    pub api_key: String,

    /// Request timeout; requests block indefinitely when unset
    #[serde(default)]
    pub timeout_seconds: Option<u64>,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingSettings {
    /// Directory for rotated log files (console only when unset)
    #[serde(default)]
    pub log_directory: Option<PathBuf>,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default = "default_log_max_files")]
    pub log_max_files: u32,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            log_directory: None,
            log_level: default_log_level(),
            log_max_files: default_log_max_files(),
        }
    }
}

/// Settings for backup uploads
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct UploadConfig {
    /// Where folder archives are staged before upload
    #[serde(default)]
    pub archive_dir: Option<PathBuf>,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_max_files() -> u32 {
    10
}
