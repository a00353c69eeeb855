//! Domain model shared with the Backupchan server
//!
//! All types here are plain data. They are rebuilt from every response; the
//! client never keeps them around as shared state.

mod backup;
mod stats;
mod target;

pub use backup::Backup;
pub use stats::Stats;
pub use target::{
    BackupRecycleAction, BackupRecycleCriteria, BackupTarget, BackupType, NewTarget, TargetEdit,
};
