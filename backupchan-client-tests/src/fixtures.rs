//! Test fixtures and sample data
//!
//! Provides pre-built targets, backups and server responses.

use backupchan_client::models::{
    Backup, BackupRecycleAction, BackupRecycleCriteria, BackupTarget, BackupType, NewTarget,
};
use backupchan_client::utils::connection::Response;
use serde_json::{json, Map, Value};

/// The nightly database target used across the API tests
pub fn nightly_db_target() -> NewTarget {
    NewTarget {
        name: "nightly-db".to_string(),
        backup_type: BackupType::Folder,
        recycle_criteria: BackupRecycleCriteria::Count,
        recycle_value: 7,
        recycle_action: BackupRecycleAction::RecycleBin,
        location: "/var/backups/db".to_string(),
        name_template: "db-%Y%m%d".to_string(),
        deduplicate: true,
        alias: None,
    }
}

/// A single-file target
pub fn single_file_target(name: &str) -> NewTarget {
    NewTarget {
        name: name.to_string(),
        backup_type: BackupType::Single,
        recycle_criteria: BackupRecycleCriteria::Age,
        recycle_value: 30,
        recycle_action: BackupRecycleAction::Delete,
        location: format!("/var/backups/{}", name),
        name_template: format!("{}-%Y%m%d", name),
        deduplicate: false,
        alias: None,
    }
}

/// Create a sample target with a fixed id
pub fn sample_target(id: &str, backup_type: BackupType) -> BackupTarget {
    BackupTarget {
        id: id.to_string(),
        name: format!("target {}", id),
        backup_type,
        recycle_criteria: BackupRecycleCriteria::None,
        recycle_value: 0,
        recycle_action: BackupRecycleAction::Delete,
        location: format!("/srv/backups/{}", id),
        name_template: "backup-%Y%m%d".to_string(),
        deduplicate: false,
        alias: None,
    }
}

/// Create a sample backup
pub fn sample_backup(id: &str, target_id: &str, is_recycled: bool) -> Backup {
    Backup {
        id: id.to_string(),
        target_id: target_id.to_string(),
        filename: format!("{}.tar.gz", id),
        manual: true,
        is_recycled,
        created_at: None,
        filesize: Some(1024),
    }
}

/// Successful envelope carrying `extra` keys
pub fn success_response(extra: Value) -> Response {
    let mut payload = match extra {
        Value::Object(map) => map,
        _ => Map::new(),
    };
    payload.insert("success".to_string(), json!(true));
    Response::new(Value::Object(payload), 200)
}

/// Failed envelope with a message
pub fn failure_response(status: u16, message: &str) -> Response {
    Response::new(json!({ "success": false, "message": message }), status)
}

/// Minimal valid config TOML
pub fn minimal_config_toml() -> &'static str {
    r#"
[connection]
host = "localhost"
port = 5050
api_key = "test-key"
"#
}
