//! Configuration resolution and graceful degradation tests
//!
//! Covers:
//! - Root folder priority: CLI > environment > TOML > compiled default
//! - Missing/invalid TOML never aborts
//! - Directory creation under the root folder
//!
//! Tests touching STOCKROOM_ROOT_FOLDER are #[serial] to avoid env races.

use serial_test::serial;
use std::env;
use std::path::PathBuf;
use stockroom_common::auth::Role;
use stockroom_common::config::{
    CompiledDefaults, LoggingConfig, RootFolderInitializer, RootFolderResolver, TomlConfig,
    ENV_ROOT_FOLDER,
};
use tempfile::TempDir;

#[test]
fn test_compiled_defaults() {
    let defaults = CompiledDefaults::for_current_platform();

    assert!(!defaults.root_folder.as_os_str().is_empty());
    assert!(defaults.root_folder.ends_with("stockroom") || defaults.root_folder.ends_with("stockroom_data"));
    assert_eq!(defaults.port, 3333);
    assert_eq!(defaults.host, "0.0.0.0");
    assert_eq!(defaults.max_upload_bytes, 10 * 1024 * 1024);
    assert_eq!(defaults.log_level, "info");
}

#[test]
#[serial]
fn test_cli_arg_takes_precedence() {
    env::set_var(ENV_ROOT_FOLDER, "/tmp/stockroom-env");

    let resolver = RootFolderResolver::new("test-module")
        .with_cli_arg(Some(PathBuf::from("/tmp/stockroom-cli")))
        .with_toml(&TomlConfig {
            root_folder: Some(PathBuf::from("/tmp/stockroom-toml")),
            ..TomlConfig::default()
        });

    assert_eq!(resolver.resolve(), PathBuf::from("/tmp/stockroom-cli"));

    env::remove_var(ENV_ROOT_FOLDER);
}

#[test]
#[serial]
fn test_env_var_beats_toml() {
    env::set_var(ENV_ROOT_FOLDER, "/tmp/stockroom-env");

    let resolver = RootFolderResolver::new("test-module").with_toml(&TomlConfig {
        root_folder: Some(PathBuf::from("/tmp/stockroom-toml")),
        ..TomlConfig::default()
    });

    assert_eq!(resolver.resolve(), PathBuf::from("/tmp/stockroom-env"));

    env::remove_var(ENV_ROOT_FOLDER);
}

#[test]
#[serial]
fn test_toml_beats_default() {
    env::remove_var(ENV_ROOT_FOLDER);

    let resolver = RootFolderResolver::new("test-module").with_toml(&TomlConfig {
        root_folder: Some(PathBuf::from("/tmp/stockroom-toml")),
        ..TomlConfig::default()
    });

    assert_eq!(resolver.resolve(), PathBuf::from("/tmp/stockroom-toml"));
}

#[test]
#[serial]
fn test_no_overrides_uses_default() {
    env::remove_var(ENV_ROOT_FOLDER);

    let resolver = RootFolderResolver::new("test-module").with_toml(&TomlConfig::default());

    let defaults = CompiledDefaults::for_current_platform();
    assert_eq!(resolver.resolve(), defaults.root_folder);
}

#[test]
fn test_initializer_creates_nested_directory() {
    let temp = TempDir::new().unwrap();
    let root = temp.path().join("level1").join("level2");

    let initializer = RootFolderInitializer::new(root.clone());
    initializer.ensure_directory_exists().unwrap();
    // Idempotent
    initializer.ensure_directory_exists().unwrap();

    assert!(root.is_dir());
    assert!(!initializer.database_path().exists());
    assert_eq!(initializer.database_path(), root.join("stockroom.db"));
}

#[test]
fn test_toml_full_file() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("config.toml");
    std::fs::write(
        &path,
        r#"
        root_folder = "/srv/stockroom"
        port = 8080
        api_key = "segredo"
        max_upload_bytes = 1048576

        [logging]
        level = "debug"

        [[users]]
        username = "master"
        role = "master"
        password_salt = "abc"
        password_hash = "00"

        [[users]]
        username = "manu"
        role = "maintenance"
        password_salt = "def"
        password_hash = "11"
        "#,
    )
    .unwrap();

    let config = TomlConfig::load(&path).unwrap();
    assert_eq!(config.root_folder, Some(PathBuf::from("/srv/stockroom")));
    assert_eq!(config.port, Some(8080));
    assert_eq!(config.api_key.as_deref(), Some("segredo"));
    assert_eq!(config.max_upload_bytes, Some(1_048_576));
    assert_eq!(config.host, None);
    assert_eq!(config.logging.level, "debug");
    assert_eq!(config.users.len(), 2);
    assert_eq!(config.users[1].role, Role::Maintenance);
}

#[test]
fn test_toml_missing_fields_default() {
    let config: TomlConfig = toml::from_str("").unwrap();
    assert_eq!(config, TomlConfig::default());
    assert_eq!(config.logging, LoggingConfig::default());
    assert!(config.users.is_empty());
}

#[test]
fn test_invalid_toml_is_config_error() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("broken.toml");
    std::fs::write(&path, "port = \"not a number\"").unwrap();

    let err = TomlConfig::load(&path).unwrap_err();
    assert!(matches!(err, stockroom_common::Error::Config(_)));
}

#[test]
fn test_missing_toml_is_config_error() {
    let err = TomlConfig::load(&PathBuf::from("/nonexistent/stockroom.toml")).unwrap_err();
    assert!(matches!(err, stockroom_common::Error::Config(_)));
}
