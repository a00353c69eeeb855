//! Recycle bin through the API

use test_utils::{sample_backup, sample_target, Api, BackupType, FakeServer, TestResult};

fn seeded_server() -> FakeServer {
    let server = FakeServer::new();
    server.seed_target(sample_target("t1", BackupType::Single));
    server.seed_backup(sample_backup("b1", "t1", false));
    server.seed_backup(sample_backup("b2", "t1", true));
    server.seed_backup(sample_backup("b3", "t1", true));
    server
}

#[test]
fn test_list_recycled_only_returns_recycled() -> TestResult {
    let api = Api::new(seeded_server());

    let recycled = api.list_recycled_backups()?;
    let ids: Vec<_> = recycled.iter().map(|b| b.id.as_str()).collect();
    assert_eq!(ids, vec!["b2", "b3"]);
    assert!(recycled.iter().all(|b| b.is_recycled));
    Ok(())
}

#[test]
fn test_clear_then_list_is_empty() -> TestResult {
    let api = Api::new(seeded_server());

    api.clear_recycle_bin(true)?;

    assert!(api.list_recycled_backups()?.is_empty());
    let (_, remaining) = api.get_target("t1")?;
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].id, "b1");
    Ok(())
}

#[test]
fn test_clear_empty_bin_succeeds() -> TestResult {
    let api = Api::new(FakeServer::new());
    api.clear_recycle_bin(false)?;
    assert!(api.list_recycled_backups()?.is_empty());
    Ok(())
}
