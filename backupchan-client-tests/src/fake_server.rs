//! In-memory stand-in for a Backupchan server
//!
//! Implements `Connection` directly, so an `Api` can be pointed at it without
//! any networking. It keeps real state, which lets tests check that what was
//! written can be read back.

use backupchan_client::models::{Backup, BackupTarget, Stats};
use backupchan_client::utils::connection::{Connection, FilePart, Method, Response};
use backupchan_client::TransportError;
use parking_lot::Mutex;
use serde_json::{json, Map, Value};
use std::collections::HashMap;
use std::io::Read;
use std::sync::Arc;

/// Targets per page on `GET target`
pub const DEFAULT_PAGE_SIZE: usize = 10;

#[derive(Default)]
struct State {
    targets: Vec<BackupTarget>,
    backups: Vec<Backup>,
    /// Stored bytes per backup id
    files: HashMap<String, Vec<u8>>,
    log: Vec<String>,
    next_id: u64,
    requests: usize,
    uploads: usize,
}

impl State {
    fn next_id(&mut self, kind: &str) -> String {
        self.next_id += 1;
        format!("{}-{:04}", kind, self.next_id)
    }
}

/// Stateful fake server
#[derive(Clone)]
pub struct FakeServer {
    state: Arc<Mutex<State>>,
    page_size: usize,
}

impl Default for FakeServer {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeServer {
    pub fn new() -> Self {
        Self {
            state: Arc::default(),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    /// Total requests received, uploads included
    pub fn request_count(&self) -> usize {
        self.state.lock().requests
    }

    pub fn upload_count(&self) -> usize {
        self.state.lock().uploads
    }

    /// Bytes stored for a backup
    pub fn stored_file(&self, backup_id: &str) -> Option<Vec<u8>> {
        self.state.lock().files.get(backup_id).cloned()
    }

    /// Insert a target directly, bypassing the API
    pub fn seed_target(&self, target: BackupTarget) {
        self.state.lock().targets.push(target);
    }

    /// Insert a backup directly, bypassing the API
    pub fn seed_backup(&self, backup: Backup) {
        self.state.lock().backups.push(backup);
    }

    fn route(&self, method: Method, path: &str, body: Option<&Value>) -> Response {
        let (route, query) = split_query(path);
        let segments: Vec<&str> = route.split('/').filter(|s| !s.is_empty()).collect();
        let mut state = self.state.lock();
        state.requests += 1;
        state.log.push(format!("{} {}", method, path));

        match (method, segments.as_slice()) {
            (Method::Get, ["target"]) => {
                let page = query.get("page").and_then(|p| p.parse::<usize>().ok()).unwrap_or(1);
                if page == 0 {
                    return failure(400, "page must be at least 1");
                }
                let targets: Vec<&BackupTarget> = state
                    .targets
                    .iter()
                    .skip((page - 1) * self.page_size)
                    .take(self.page_size)
                    .collect();
                success(json!({ "targets": targets }))
            }

            (Method::Post, ["target"]) => {
                let Some(Value::Object(fields)) = body else {
                    return failure(400, "missing body");
                };
                let id = state.next_id("target");
                let mut fields = fields.clone();
                fields.insert("id".to_string(), json!(id));

                let target: BackupTarget = match serde_json::from_value(Value::Object(fields)) {
                    Ok(target) => target,
                    Err(e) => return failure(400, &e.to_string()),
                };
                if let Some(ref alias) = target.alias {
                    if state.targets.iter().any(|t| t.alias.as_ref() == Some(alias)) {
                        return failure(409, "alias already in use");
                    }
                }
                state.targets.push(target);
                success(json!({ "id": id }))
            }

            (Method::Get, ["target", id]) => {
                let Some(target) = state.targets.iter().find(|t| t.id == *id) else {
                    return failure(404, "Target not found");
                };
                let backups: Vec<&Backup> =
                    state.backups.iter().filter(|b| b.target_id == *id).rev().collect();
                success(json!({ "target": target, "backups": backups }))
            }

            (Method::Patch, ["target", id]) => {
                let Some(Value::Object(fields)) = body else {
                    return failure(400, "missing body");
                };
                let Some(index) = state.targets.iter().position(|t| t.id == *id) else {
                    return failure(404, "Target not found");
                };

                let mut merged = match serde_json::to_value(&state.targets[index]) {
                    Ok(Value::Object(map)) => map,
                    _ => return failure(500, "corrupt target"),
                };
                for (key, value) in fields {
                    if key != "id" && key != "backup_type" {
                        merged.insert(key.clone(), value.clone());
                    }
                }
                match serde_json::from_value(Value::Object(merged)) {
                    Ok(target) => {
                        state.targets[index] = target;
                        success(json!({}))
                    }
                    Err(e) => failure(400, &e.to_string()),
                }
            }

            (Method::Delete, ["target", id]) => {
                let before = state.targets.len();
                state.targets.retain(|t| t.id != *id);
                if state.targets.len() == before {
                    return failure(404, "Target not found");
                }
                state.backups.retain(|b| b.target_id != *id);
                success(json!({}))
            }

            (Method::Delete, ["target", id, "all"]) => {
                if !state.targets.iter().any(|t| t.id == *id) {
                    return failure(404, "Target not found");
                }
                state.backups.retain(|b| b.target_id != *id);
                success(json!({}))
            }

            (Method::Delete, ["backup", id]) => {
                let before = state.backups.len();
                state.backups.retain(|b| b.id != *id);
                if state.backups.len() == before {
                    return failure(404, "Backup not found");
                }
                success(json!({}))
            }

            (Method::Patch, ["backup", id]) => {
                let Some(is_recycled) = body.and_then(|b| b.get("is_recycled")).and_then(Value::as_bool)
                else {
                    return failure(400, "is_recycled is required");
                };
                match state.backups.iter_mut().find(|b| b.id == *id) {
                    Some(backup) => {
                        backup.is_recycled = is_recycled;
                        success(json!({}))
                    }
                    None => failure(404, "Backup not found"),
                }
            }

            (Method::Get, ["recycle_bin"]) => {
                let backups: Vec<&Backup> = state.backups.iter().filter(|b| b.is_recycled).collect();
                success(json!({ "backups": backups }))
            }

            (Method::Delete, ["recycle_bin"]) => {
                state.backups.retain(|b| !b.is_recycled);
                success(json!({}))
            }

            (Method::Get, ["log"]) => {
                let tail = query.get("tail").and_then(|t| t.parse::<usize>().ok()).unwrap_or(100);
                let start = state.log.len().saturating_sub(tail);
                success(json!({ "log": state.log[start..].join("\n") }))
            }

            (Method::Get, ["stats"]) => {
                let recycled: Vec<&Backup> = state.backups.iter().filter(|b| b.is_recycled).collect();
                let stats = Stats {
                    program_version: "fake".to_string(),
                    total_target_size: state
                        .backups
                        .iter()
                        .filter(|b| !b.is_recycled)
                        .filter_map(|b| b.filesize)
                        .sum(),
                    total_recycle_bin_size: recycled.iter().filter_map(|b| b.filesize).sum(),
                    total_targets: state.targets.len() as u64,
                    total_backups: state.backups.len() as u64,
                    total_recycled_backups: recycled.len() as u64,
                };
                let mut payload = match serde_json::to_value(stats) {
                    Ok(Value::Object(map)) => map,
                    _ => Map::new(),
                };
                payload.insert("success".to_string(), json!(true));
                Response::new(Value::Object(payload), 200)
            }

            _ => failure(404, "Not found"),
        }
    }

    fn upload(&self, path: &str, fields: &[(&str, String)], contents: Vec<u8>, filename: String) -> Response {
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        let mut state = self.state.lock();
        state.requests += 1;
        state.log.push(format!("POST {} ({})", path, filename));

        let ["target", target_id, "upload"] = segments.as_slice() else {
            return failure(404, "Not found");
        };
        if !state.targets.iter().any(|t| t.id == *target_id) {
            return failure(404, "Target not found");
        }
        let Some(manual) = fields.iter().find(|(name, _)| *name == "manual") else {
            return failure(400, "manual is required");
        };

        let id = state.next_id("backup");
        state.uploads += 1;
        state.backups.push(Backup {
            id: id.clone(),
            target_id: target_id.to_string(),
            filename,
            manual: manual.1 == "1",
            is_recycled: false,
            created_at: Some(chrono::Utc::now()),
            filesize: Some(contents.len() as u64),
        });
        state.files.insert(id.clone(), contents);

        success(json!({ "id": id }))
    }
}

impl Connection for FakeServer {
    fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<Response, TransportError> {
        Ok(self.route(method, path, body))
    }

    fn post_multipart(
        &self,
        path: &str,
        fields: &[(&str, String)],
        mut file: FilePart,
    ) -> Result<Response, TransportError> {
        let mut contents = Vec::new();
        file.reader
            .read_to_end(&mut contents)
            .map_err(|e| TransportError::Client(e.to_string()))?;
        Ok(self.upload(path, fields, contents, file.filename))
    }
}

fn split_query(path: &str) -> (&str, HashMap<&str, &str>) {
    match path.split_once('?') {
        Some((route, query)) => (
            route,
            query
                .split('&')
                .filter_map(|pair| pair.split_once('='))
                .collect(),
        ),
        None => (path, HashMap::new()),
    }
}

fn success(extra: Value) -> Response {
    let mut payload = match extra {
        Value::Object(map) => map,
        _ => Map::new(),
    };
    payload.insert("success".to_string(), json!(true));
    Response::new(Value::Object(payload), 200)
}

fn failure(status: u16, message: &str) -> Response {
    Response::new(json!({ "success": false, "message": message }), status)
}
