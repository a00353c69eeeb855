//! Test utilities for backupchan-client
//!
//! This crate provides shared fixtures, a scratch-directory harness and an
//! in-memory fake server for testing the client.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use test_utils::{nightly_db_target, Api, FakeServer};
//!
//! #[test]
//! fn my_test() {
//!     let server = FakeServer::new();
//!     let api = Api::new(server.clone());
//!     let id = api.new_target(&nightly_db_target()).unwrap();
//!     // ... test code
//! }
//! ```

pub mod config_builder;
pub mod fake_server;
pub mod fixtures;
pub mod test_context;

// Re-export commonly used items
pub use config_builder::ConfigBuilder;
pub use fake_server::FakeServer;
pub use fixtures::*;
pub use test_context::{ResultAssertions, TestContext};

// Re-export types from the main crate for convenience
pub use backupchan_client::models::{
    Backup, BackupRecycleAction, BackupRecycleCriteria, BackupTarget, BackupType, NewTarget,
    Stats, TargetEdit,
};
pub use backupchan_client::{Api, ApiError};

// Re-export mock implementations from the main crate
pub use backupchan_client::utils::connection::mock::MockConnection;
pub use backupchan_client::utils::connection::{Connection, Method, Response};

/// Common test result type
pub type TestResult<T = ()> = anyhow::Result<T>;
