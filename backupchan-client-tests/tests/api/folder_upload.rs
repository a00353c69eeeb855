//! Folder uploads through the API
//!
//! Covers the pre-upload checks and the lifetime of the temporary archive.

use flate2::read::GzDecoder;
use serde_json::json;
use test_utils::{
    failure_response, nightly_db_target, sample_target, single_file_target, success_response,
    Api, ApiError, BackupType, FakeServer, Method, MockConnection, TestContext, TestResult,
};

#[test]
fn test_folder_upload_stores_archive() -> TestResult {
    let ctx = TestContext::new();
    let folder = ctx.create_folder_tree("photos");
    let server = FakeServer::new();
    let api = Api::new(server.clone()).with_archive_dir(ctx.archive_dir());
    let target_id = api.new_target(&nightly_db_target())?;

    let backup_id = api.upload_backup_folder(&target_id, &folder, true)?;

    let (_, backups) = api.get_target(&target_id)?;
    assert_eq!(backups[0].id, backup_id);
    assert_eq!(backups[0].filename, "photos.tar.gz");
    assert!(backups[0].manual);

    let stored = server.stored_file(&backup_id).unwrap();
    let mut archive = tar::Archive::new(GzDecoder::new(stored.as_slice()));
    let names: Vec<String> = archive
        .entries()?
        .map(|entry| entry.unwrap().path().unwrap().display().to_string())
        .collect();
    assert!(names.contains(&"photos/db/dump.sql".to_string()));
    Ok(())
}

#[test]
fn test_archive_staged_inside_folder_is_left_out() -> TestResult {
    let ctx = TestContext::new();
    let folder = ctx.create_folder_tree("home");
    let server = FakeServer::new();
    let api = Api::new(server.clone()).with_archive_dir(&folder);
    let target_id = api.new_target(&nightly_db_target())?;

    let backup_id = api.upload_backup_folder(&target_id, &folder, true)?;

    let stored = server.stored_file(&backup_id).unwrap();
    let mut archive = tar::Archive::new(GzDecoder::new(stored.as_slice()));
    let mut files: Vec<String> = archive
        .entries()?
        .filter_map(|entry| {
            let entry = entry.unwrap();
            entry
                .header()
                .entry_type()
                .is_file()
                .then(|| entry.path().unwrap().display().to_string())
        })
        .collect();
    files.sort();
    assert_eq!(
        files,
        vec!["home/README.md", "home/db/dump.sql", "home/db/schema/v1.sql"]
    );

    // Nothing left behind in the folder either
    assert_eq!(std::fs::read_dir(&folder)?.count(), 2);
    Ok(())
}

#[test]
fn test_temp_archive_removed_after_success() -> TestResult {
    let ctx = TestContext::new();
    let folder = ctx.create_folder_tree("data");
    let api = Api::new(FakeServer::new()).with_archive_dir(ctx.archive_dir());
    let target_id = api.new_target(&nightly_db_target())?;

    for _ in 0..3 {
        api.upload_backup_folder(&target_id, &folder, false)?;
    }

    assert_eq!(ctx.archive_count(), 0);
    Ok(())
}

#[test]
fn test_temp_archive_removed_after_rejected_upload() {
    let ctx = TestContext::new();
    let folder = ctx.create_folder_tree("data");
    let mock = MockConnection::new()
        .expect(
            Method::Get,
            "target/t1",
            success_response(json!({
                "target": sample_target("t1", BackupType::Folder),
                "backups": []
            })),
        )
        .expect(
            Method::Post,
            "target/t1/upload",
            failure_response(507, "Insufficient storage"),
        );
    let api = Api::new(mock.clone()).with_archive_dir(ctx.archive_dir());

    let err = api.upload_backup_folder("t1", &folder, true).unwrap_err();

    assert_eq!(err.status(), Some(507));
    assert_eq!(mock.upload_count(), 1);
    assert_eq!(ctx.archive_count(), 0);
}

#[test]
fn test_temp_archive_removed_after_transport_failure() {
    let ctx = TestContext::new();
    let folder = ctx.create_folder_tree("data");

    // The target read succeeds; the upload never reaches a server
    let server = FakeServer::new();
    server.seed_target(sample_target("t1", BackupType::Folder));
    let api = Api::new(FailingUploads(server)).with_archive_dir(ctx.archive_dir());

    let err = api.upload_backup_folder("t1", &folder, true).unwrap_err();

    assert!(matches!(err, ApiError::Transport(_)));
    assert_eq!(ctx.archive_count(), 0);
}

#[test]
fn test_single_target_rejected_without_upload() -> TestResult {
    let ctx = TestContext::new();
    let folder = ctx.create_folder_tree("data");
    let server = FakeServer::new();
    let api = Api::new(server.clone()).with_archive_dir(ctx.archive_dir());
    let target_id = api.new_target(&single_file_target("db"))?;
    let requests_before = server.request_count();

    let err = api.upload_backup_folder(&target_id, &folder, true).unwrap_err();

    assert!(matches!(err, ApiError::InvalidUploadRequest { .. }));
    // Only the target read goes out
    assert_eq!(server.request_count(), requests_before + 1);
    assert_eq!(server.upload_count(), 0);
    assert_eq!(ctx.archive_count(), 0);
    Ok(())
}

#[test]
fn test_missing_folder_rejected_without_requests() {
    let ctx = TestContext::new();
    let server = FakeServer::new();
    let api = Api::new(server.clone()).with_archive_dir(ctx.archive_dir());

    let err = api
        .upload_backup_folder("t1", &ctx.temp_dir().join("absent"), true)
        .unwrap_err();

    assert!(matches!(err, ApiError::InvalidUploadRequest { .. }));
    assert_eq!(server.request_count(), 0);
}

#[test]
fn test_file_path_rejected_as_folder() {
    let ctx = TestContext::new();
    let file = ctx.create_file("notes.txt", "not a folder");
    let server = FakeServer::new();
    let api = Api::new(server.clone()).with_archive_dir(ctx.archive_dir());

    let err = api.upload_backup_folder("t1", &file, true).unwrap_err();

    assert!(err.to_string().contains("not a directory"));
    assert_eq!(server.request_count(), 0);
}

#[test]
fn test_folder_upload_to_missing_target() {
    let ctx = TestContext::new();
    let folder = ctx.create_folder_tree("data");
    let server = FakeServer::new();
    let api = Api::new(server.clone()).with_archive_dir(ctx.archive_dir());

    let err = api.upload_backup_folder("ghost", &folder, true).unwrap_err();

    assert_eq!(err.status(), Some(404));
    assert_eq!(server.upload_count(), 0);
    assert_eq!(ctx.archive_count(), 0);
}

/// Passes requests through but drops every upload on the floor
struct FailingUploads(FakeServer);

impl test_utils::Connection for FailingUploads {
    fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<&serde_json::Value>,
    ) -> Result<test_utils::Response, backupchan_client::TransportError> {
        self.0.request(method, path, body)
    }

    fn post_multipart(
        &self,
        _path: &str,
        _fields: &[(&str, String)],
        _file: backupchan_client::utils::connection::FilePart,
    ) -> Result<test_utils::Response, backupchan_client::TransportError> {
        Err(backupchan_client::TransportError::Client(
            "connection reset".to_string(),
        ))
    }
}
