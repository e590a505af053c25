//! Config file loading against real files on disk.

use tempfile::TempDir;
use voicegate_core::config::{Config, CONFIG_FILE};
use voicegate_core::ConfigError;

#[test]
fn test_load_full_config_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(CONFIG_FILE);
    std::fs::write(
        &path,
        "# relay settings\nSERVER_PORT=8080\n\nOPENAI_API_KEY=\"sk-from-file\"\n",
    )
    .unwrap();

    let config = Config::load(&path).unwrap();
    assert_eq!(config.server_port, 8080);
    assert_eq!(config.api_key.expose_secret(), "sk-from-file");
    assert_eq!(config.listen_addr().to_string(), "0.0.0.0:8080");
}

#[test]
fn test_missing_file_is_startup_fatal() {
    let dir = TempDir::new().unwrap();
    let err = Config::load(&dir.path().join(CONFIG_FILE)).unwrap_err();
    assert!(matches!(err, ConfigError::NotFound(_)));
}

#[test]
fn test_missing_credential_is_startup_fatal() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(CONFIG_FILE);
    std::fs::write(&path, "SERVER_PORT=8080\n").unwrap();

    let err = Config::load(&path).unwrap_err();
    assert!(matches!(err, ConfigError::MissingKey(ref k) if k == "OPENAI_API_KEY"));
}
