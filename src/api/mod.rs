//! Typed facade over the Backupchan HTTP API
//!
//! Each operation builds its payload, sends it through the `Connection`,
//! validates the envelope and projects the result onto the domain model.
//!
//! ## Example Usage
//!
//! ```no_run
//! use backupchan_client::{Api, HttpConnection};
//!
//! let connection = HttpConnection::new("localhost", 5050, "secret", None)?;
//! let api = Api::new(connection);
//!
//! for target in api.list_targets(1)? {
//!     println!("{} ({})", target.name, target.backup_type);
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod envelope;
pub mod error;

use crate::config::Config;
use crate::models::{Backup, BackupTarget, NewTarget, Stats, TargetEdit};
use crate::utils::archive::{self, FolderArchive};
use crate::utils::connection::{Connection, FilePart, HttpConnection, Method};
use envelope::{check_success, take_field};
use serde_json::{json, Map, Value};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

pub use error::{ApiError, Result, TransportError};

/// Multipart field carrying the backup file
const UPLOAD_FIELD: &str = "backup_file";

/// Client for one Backupchan server
pub struct Api<C: Connection = HttpConnection> {
    connection: C,
    archive_dir: PathBuf,
}

impl Api<HttpConnection> {
    /// Build an HTTP client from a loaded configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        let conn = &config.connection;
        let connection = HttpConnection::new(
            &conn.host,
            conn.port,
            &conn.api_key,
            conn.timeout_seconds.map(Duration::from_secs),
        )?;

        let mut api = Self::new(connection);
        if let Some(ref dir) = config.upload.archive_dir {
            api = api.with_archive_dir(crate::config::expand_tilde(dir));
        }
        Ok(api)
    }
}

impl<C: Connection> Api<C> {
    pub fn new(connection: C) -> Self {
        Self {
            connection,
            archive_dir: archive::default_archive_dir(),
        }
    }

    /// Write temporary folder archives to `dir` instead of the system temp directory
    pub fn with_archive_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.archive_dir = dir.into();
        self
    }

    pub fn connection(&self) -> &C {
        &self.connection
    }

    pub fn archive_dir(&self) -> &Path {
        &self.archive_dir
    }

    /// Send a request and validate its envelope
    fn call(&self, method: Method, path: &str, body: Option<Value>) -> Result<Map<String, Value>> {
        let response = self.connection.request(method, path, body.as_ref())?;
        check_success(response)
    }

    /// List targets on a 1-based page; pages past the end are empty
    pub fn list_targets(&self, page: u32) -> Result<Vec<BackupTarget>> {
        let mut payload = self.call(Method::Get, &format!("target?page={}", page), None)?;
        take_field(&mut payload, "targets")
    }

    /// Create a target and return its id
    pub fn new_target(&self, target: &NewTarget) -> Result<String> {
        let body = serde_json::to_value(target)?;
        let mut payload = self.call(Method::Post, "target", Some(body))?;
        let id: String = take_field(&mut payload, "id")?;
        info!("Created target '{}' with id {}", target.name, id);
        Ok(id)
    }

    /// Fetch a target together with all of its backups
    pub fn get_target(&self, id: &str) -> Result<(BackupTarget, Vec<Backup>)> {
        let mut payload = self.call(Method::Get, &format!("target/{}", id), None)?;
        let target = take_field(&mut payload, "target")?;
        let backups = take_field(&mut payload, "backups")?;
        Ok((target, backups))
    }

    /// Replace all mutable fields of a target
    pub fn edit_target(&self, id: &str, edit: &TargetEdit) -> Result<()> {
        let body = serde_json::to_value(edit)?;
        self.call(Method::Patch, &format!("target/{}", id), Some(body))?;
        Ok(())
    }

    /// Delete a target; `delete_files` also removes the stored artifacts
    pub fn delete_target(&self, id: &str, delete_files: bool) -> Result<()> {
        self.call(
            Method::Delete,
            &format!("target/{}", id),
            Some(json!({ "delete_files": delete_files })),
        )?;
        Ok(())
    }

    /// Delete every backup of a target, keeping the target itself
    pub fn delete_target_backups(&self, id: &str, delete_files: bool) -> Result<()> {
        self.call(
            Method::Delete,
            &format!("target/{}/all", id),
            Some(json!({ "delete_files": delete_files })),
        )?;
        Ok(())
    }

    /// Upload a backup from any reader and return the new backup's id
    ///
    /// The reader is handed to the transport, so it must be owned (`'static`).
    /// Borrowed data can be passed as a `Cursor` over a copy, or as a
    /// `Box<dyn Read + Send>`; use `upload_backup_file` for paths on disk.
    pub fn upload_backup<R>(&self, target_id: &str, file: R, filename: &str, manual: bool) -> Result<String>
    where
        R: Read + Send + 'static,
    {
        self.upload_part(
            target_id,
            FilePart {
                field: UPLOAD_FIELD.to_string(),
                filename: filename.to_string(),
                reader: Box::new(file),
                length: None,
            },
            manual,
        )
    }

    /// Upload a local file under its own file name
    pub fn upload_backup_file(&self, target_id: &str, path: &Path, manual: bool) -> Result<String> {
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .ok_or_else(|| ApiError::invalid_upload(format!("{:?} has no file name", path)))?;

        let file = File::open(path)?;
        let length = file.metadata()?.len();

        self.upload_part(
            target_id,
            FilePart {
                field: UPLOAD_FIELD.to_string(),
                filename,
                reader: Box::new(file),
                length: Some(length),
            },
            manual,
        )
    }

    /// Package a directory as `<name>.tar.gz` and upload it
    ///
    /// Fails before any upload if `folder` is not a directory or if the target
    /// only holds single-file backups. The target is read once to learn its
    /// type; a type change racing with this call is not detected.
    pub fn upload_backup_folder(&self, target_id: &str, folder: &Path, manual: bool) -> Result<String> {
        if !folder.is_dir() {
            return Err(ApiError::invalid_upload(format!(
                "{:?} is not a directory",
                folder
            )));
        }
        if archive::folder_base_name(folder)?.is_none() {
            return Err(ApiError::invalid_upload(format!(
                "{:?} has no directory name",
                folder
            )));
        }

        let (target, _) = self.get_target(target_id)?;
        if !target.accepts_folders() {
            return Err(ApiError::invalid_upload(format!(
                "Target '{}' only accepts single-file backups",
                target.name
            )));
        }

        // Removed when `archive` goes out of scope, whatever the upload outcome
        let archive = FolderArchive::create(folder, &self.archive_dir)?;

        self.upload_part(
            target_id,
            FilePart {
                field: UPLOAD_FIELD.to_string(),
                filename: archive.upload_name().to_string(),
                reader: Box::new(archive.reader()?),
                length: Some(archive.len()?),
            },
            manual,
        )
    }

    fn upload_part(&self, target_id: &str, file: FilePart, manual: bool) -> Result<String> {
        let filename = file.filename.clone();
        debug!("Uploading '{}' to target {}", filename, target_id);

        let fields = [("manual", if manual { "1" } else { "0" }.to_string())];
        let response = self.connection.post_multipart(
            &format!("target/{}/upload", target_id),
            &fields,
            file,
        )?;

        let mut payload = check_success(response)?;
        let id: String = take_field(&mut payload, "id")?;
        info!("Uploaded '{}' to target {} as backup {}", filename, target_id, id);
        Ok(id)
    }

    /// Delete one backup
    pub fn delete_backup(&self, id: &str, delete_files: bool) -> Result<()> {
        self.call(
            Method::Delete,
            &format!("backup/{}", id),
            Some(json!({ "delete_files": delete_files })),
        )?;
        Ok(())
    }

    /// Move a backup into (`true`) or out of (`false`) the recycle bin
    pub fn recycle_backup(&self, id: &str, is_recycled: bool) -> Result<()> {
        self.call(
            Method::Patch,
            &format!("backup/{}", id),
            Some(json!({ "is_recycled": is_recycled })),
        )?;
        Ok(())
    }

    pub fn list_recycled_backups(&self) -> Result<Vec<Backup>> {
        let mut payload = self.call(Method::Get, "recycle_bin", None)?;
        take_field(&mut payload, "backups")
    }

    pub fn clear_recycle_bin(&self, delete_files: bool) -> Result<()> {
        self.call(
            Method::Delete,
            "recycle_bin",
            Some(json!({ "delete_files": delete_files })),
        )?;
        Ok(())
    }

    /// Last `tail` lines of the server log
    pub fn get_log(&self, tail: u32) -> Result<String> {
        let mut payload = self.call(Method::Get, &format!("log?tail={}", tail), None)?;
        take_field(&mut payload, "log")
    }

    pub fn view_stats(&self) -> Result<Stats> {
        let payload = self.call(Method::Get, "stats", None)?;
        serde_json::from_value(Value::Object(payload))
            .map_err(|e| ApiError::MalformedResponse(format!("invalid stats: {}", e)))
    }
}
