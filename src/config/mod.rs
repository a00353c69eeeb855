//! Configuration module for the Backupchan client
//!
//! This module handles loading and validating the client configuration from a
//! TOML file.
//!
//! ## Example Usage
//!
//! ```no_run
//! use backupchan_client::{config, Api};
//!
//! let config = config::load_config(config::default_config_path())?;
//! let api = Api::from_config(&config)?;
//! println!("{} targets", api.view_stats()?.total_targets);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod loader;
mod types;

pub use loader::{load_config, parse_config, ConfigError, Result, API_KEY_ENV};
pub use types::*;

use std::path::{Path, PathBuf};

/// Default config location: `<config_dir>/backupchan/config.toml`
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("backupchan")
        .join("config.toml")
}

/// Expand tilde (~) in path
pub fn expand_tilde(path: &Path) -> PathBuf {
    if let Ok(stripped) = path.strip_prefix("~") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    path.to_path_buf()
}
