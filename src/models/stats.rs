use serde::{Deserialize, Serialize};

/// Aggregate counters reported by the server
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct Stats {
    pub program_version: String,
    /// Bytes stored across all targets
    pub total_target_size: u64,
    /// Bytes held in the recycle bin
    pub total_recycle_bin_size: u64,
    pub total_targets: u64,
    pub total_backups: u64,
    pub total_recycled_backups: u64,
}
