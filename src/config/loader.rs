use super::types::*;
use std::fs;
use std::path::Path;

/// Environment variable that overrides `connection.api_key`
pub const API_KEY_ENV: &str = "BACKUPCHAN_API_KEY";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    ValidationError(String),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Load and validate configuration from a TOML file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    let contents = fs::read_to_string(path)?;
    parse_config(&contents)
}

/// Parse and validate configuration from TOML text
pub fn parse_config(contents: &str) -> Result<Config> {
    let mut config: Config = toml::from_str(contents)?;
    apply_env_overrides(&mut config);
    validate_config(&config)?;
    Ok(config)
}

fn apply_env_overrides(config: &mut Config) {
    if let Ok(api_key) = std::env::var(API_KEY_ENV) {
        if !api_key.is_empty() {
            config.connection.api_key = api_key;
        }
    }
}

/// Validate the configuration
fn validate_config(config: &Config) -> Result<()> {
    let connection = &config.connection;

    if connection.host.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "connection.host must not be empty".to_string(),
        ));
    }

    if connection.port == 0 {
        return Err(ConfigError::ValidationError(
            "connection.port must not be 0".to_string(),
        ));
    }

    if connection.api_key.is_empty() {
        return Err(ConfigError::ValidationError(format!(
            "connection.api_key is empty (set it in the config or via {})",
            API_KEY_ENV
        )));
    }

    if connection.timeout_seconds == Some(0) {
        return Err(ConfigError::ValidationError(
            "connection.timeout_seconds must be positive".to_string(),
        ));
    }

    Ok(())
}
