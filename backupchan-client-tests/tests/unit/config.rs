//! Unit tests for configuration loading and validation
//!
//! These tests go through files on disk, the way the CLI loads its config.

use backupchan_client::config::{load_config, ConfigError, API_KEY_ENV};
use backupchan_client::Api;
use serial_test::serial;
use test_utils::{minimal_config_toml, ConfigBuilder, TestContext};

#[test]
#[serial]
fn test_config_loading_valid() {
    std::env::remove_var(API_KEY_ENV);
    let (config_path, _temp_dir) = ConfigBuilder::new().timeout_seconds(30).write();

    let loaded = load_config(&config_path);
    assert!(loaded.is_ok(), "Config should load successfully: {:?}", loaded.err());

    let config = loaded.unwrap();
    assert_eq!(config.connection.api_key, "test-key");
    assert_eq!(config.connection.timeout_seconds, Some(30));
}

#[test]
fn test_config_loading_missing_file() {
    let ctx = TestContext::new();
    let result = load_config(ctx.temp_dir().join("absent.toml"));
    assert!(matches!(result, Err(ConfigError::ReadError(_))));
}

#[test]
fn test_config_loading_invalid_toml() {
    let ctx = TestContext::new();
    let path = ctx.create_file("config.toml", "[connection\nhost = ");
    let result = load_config(&path);
    assert!(matches!(result, Err(ConfigError::ParseError(_))));
}

#[test]
fn test_config_missing_port_rejected() {
    let ctx = TestContext::new();
    let path = ctx.create_file(
        "config.toml",
        r#"
[connection]
host = "localhost"
api_key = "k"
"#,
    );
    assert!(matches!(load_config(&path), Err(ConfigError::ParseError(_))));
}

#[test]
#[serial]
fn test_config_zero_port_rejected() {
    std::env::remove_var(API_KEY_ENV);
    let (config_path, _temp_dir) = ConfigBuilder::new().port(0).write();

    match load_config(&config_path) {
        Err(ConfigError::ValidationError(msg)) => assert!(msg.contains("port")),
        other => panic!("Expected validation error, got {:?}", other),
    }
}

#[test]
#[serial]
fn test_env_key_fills_empty_config_key() {
    let (config_path, _temp_dir) = ConfigBuilder::new().api_key("").write();

    std::env::set_var(API_KEY_ENV, "env-key");
    let result = load_config(&config_path);
    std::env::remove_var(API_KEY_ENV);

    assert_eq!(result.unwrap().connection.api_key, "env-key");
}

#[test]
#[serial]
fn test_api_from_config_uses_archive_dir() {
    std::env::remove_var(API_KEY_ENV);
    let (config_path, temp_dir) = ConfigBuilder::new()
        .host("https://backups.example")
        .with_archive_dir()
        .write();

    let config = load_config(&config_path).unwrap();
    let api = Api::from_config(&config).unwrap();

    assert_eq!(api.archive_dir(), temp_dir.path().join("archives"));
    assert_eq!(
        api.connection().base_url(),
        "https://backups.example:5050/api"
    );
}

#[test]
#[serial]
fn test_minimal_config_fixture_loads() {
    std::env::remove_var(API_KEY_ENV);
    let ctx = TestContext::new();
    let path = ctx.create_file("config.toml", minimal_config_toml());
    let config = load_config(&path).unwrap();
    assert_eq!(config.connection.host, "localhost");
}
