//! Backup uploads and lifecycle through the API

use std::io::Cursor;
use test_utils::{
    sample_backup, single_file_target, Api, FakeServer, ResultAssertions, TestContext, TestResult,
};

#[test]
fn test_manual_single_upload_returns_id() -> TestResult {
    let server = FakeServer::new();
    let api = Api::new(server.clone());
    let target_id = api.new_target(&single_file_target("db"))?;

    let backup_id = api.upload_backup(
        &target_id,
        Cursor::new(b"select 1;".to_vec()),
        "dump.sql",
        true,
    )?;
    assert!(!backup_id.is_empty());

    let (_, backups) = api.get_target(&target_id)?;
    assert_eq!(backups.len(), 1);
    assert_eq!(backups[0].id, backup_id);
    assert_eq!(backups[0].filename, "dump.sql");
    assert!(backups[0].manual);
    assert_eq!(server.stored_file(&backup_id).unwrap(), b"select 1;");
    Ok(())
}

#[test]
fn test_scheduled_upload_is_not_manual() -> TestResult {
    let api = Api::new(FakeServer::new());
    let target_id = api.new_target(&single_file_target("db"))?;

    api.upload_backup(&target_id, Cursor::new(vec![0u8; 16]), "auto.bin", false)?;

    let (_, backups) = api.get_target(&target_id)?;
    assert!(!backups[0].manual);
    Ok(())
}

#[test]
fn test_upload_file_uses_its_name() -> TestResult {
    let ctx = TestContext::new();
    let path = ctx.create_file("exports/notes.txt", "remember the milk");
    let server = FakeServer::new();
    let api = Api::new(server.clone());
    let target_id = api.new_target(&single_file_target("notes"))?;

    let backup_id = api.upload_backup_file(&target_id, &path, true)?;

    let (_, backups) = api.get_target(&target_id)?;
    assert_eq!(backups[0].filename, "notes.txt");
    assert_eq!(backups[0].filesize, Some(17));
    assert_eq!(server.stored_file(&backup_id).unwrap(), b"remember the milk");
    Ok(())
}

#[test]
fn test_upload_to_missing_target_fails() {
    let api = Api::new(FakeServer::new());
    let err = api
        .upload_backup("ghost", Cursor::new(Vec::new()), "x", true)
        .unwrap_err();
    assert_eq!(err.status(), Some(404));
}

#[test]
fn test_backups_listed_newest_first() -> TestResult {
    let api = Api::new(FakeServer::new());
    let target_id = api.new_target(&single_file_target("db"))?;

    let first = api.upload_backup(&target_id, Cursor::new(vec![1]), "1.bin", true)?;
    let second = api.upload_backup(&target_id, Cursor::new(vec![2]), "2.bin", true)?;

    let (_, backups) = api.get_target(&target_id)?;
    let ids: Vec<_> = backups.iter().map(|b| b.id.clone()).collect();
    assert_eq!(ids, vec![second, first]);
    Ok(())
}

#[test]
fn test_recycle_and_restore_backup() -> TestResult {
    let api = Api::new(FakeServer::new());
    let target_id = api.new_target(&single_file_target("db"))?;
    let backup_id = api.upload_backup(&target_id, Cursor::new(vec![1]), "1.bin", true)?;

    api.recycle_backup(&backup_id, true)?;
    let (_, backups) = api.get_target(&target_id)?;
    assert!(backups[0].is_recycled);

    api.recycle_backup(&backup_id, false)?;
    let (_, backups) = api.get_target(&target_id)?;
    assert!(!backups[0].is_recycled);
    Ok(())
}

#[test]
fn test_delete_backup() -> TestResult {
    let server = FakeServer::new();
    let api = Api::new(server.clone());
    let target_id = api.new_target(&single_file_target("db"))?;
    server.seed_backup(sample_backup("seeded", &target_id, false));

    api.delete_backup("seeded", true)?;
    let (_, backups) = api.get_target(&target_id)?;
    assert!(backups.is_empty());

    api.delete_backup("seeded", true).assert_err_contains("404");
    Ok(())
}
