//! Backupchan Client Library
//!
//! This library talks to a Backupchan server: it manages backup targets,
//! uploads files and folders as backups, and drives the recycle bin.

pub mod api;
pub mod config;
pub mod logging;
pub mod models;
pub mod utils;

// Re-export commonly used types
pub use api::{Api, ApiError, TransportError};
pub use config::{load_config, Config};
pub use logging::{init_console_logging, init_logging, LogGuard, LoggingConfig};
pub use models::{
    Backup, BackupRecycleAction, BackupRecycleCriteria, BackupTarget, BackupType, NewTarget,
    Stats, TargetEdit,
};
pub use utils::connection::{Connection, HttpConnection};
