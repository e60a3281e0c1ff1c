//! Integration tests for config file loading.
//!
//! Tests that touch the working directory or `JSXBRIDGE_*` variables run serially.

use jsxbridge_cli::config::{CONFIG_FILE_NAME, ConfigFile};
use jsxbridge_cli::{CliError, ConfigError};
use serial_test::serial;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn write_config(dir: &Path, name: &str, body: &str) {
    fs::write(dir.join(name), body).unwrap();
}

#[test]
#[serial]
fn test_load_explicit_path_sets_root() {
    let temp = TempDir::new().unwrap();
    let nested = temp.path().join("project");
    fs::create_dir_all(&nested).unwrap();
    write_config(
        &nested,
        "dev.json",
        r#"{ "jsEntry": "lib/index.js", "dest": "dist/index.jsx", "app": "Adobe InDesign 2024" }"#,
    );

    let file = ConfigFile::load(Some(&nested.join("dev.json"))).unwrap();
    assert_eq!(file.root(), nested.as_path());
    assert_eq!(file.config.app.as_deref(), Some("Adobe InDesign 2024"));

    let build = file.config.to_build_config(file.root());
    assert_eq!(build.dest_path(), nested.join("dist/index.jsx"));
}

#[test]
#[serial]
fn test_load_default_file_from_working_directory() {
    let temp = TempDir::new().unwrap();
    write_config(
        temp.path(),
        CONFIG_FILE_NAME,
        r#"{ "jsEntry": "lib/index.js", "dest": "dist/index.jsx", "devConnectPort": 8090 }"#,
    );

    let previous = std::env::current_dir().unwrap();
    std::env::set_current_dir(temp.path()).unwrap();
    let result = ConfigFile::load(None);
    std::env::set_current_dir(previous).unwrap();

    let file = result.unwrap();
    assert_eq!(file.config.dev_connect_port, Some(8090));
    assert_eq!(file.config.dev_connect_host, "localhost");
}

#[test]
#[serial]
fn test_missing_file_names_expected_path() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("nope.json");

    let err = ConfigFile::load(Some(&path)).unwrap_err();
    match &err {
        CliError::Config(ConfigError::NotFound(missing)) => assert_eq!(missing, &path),
        other => panic!("expected NotFound, got {:?}", other),
    }
    assert!(err.to_string().contains(&path.display().to_string()));
}

#[test]
#[serial]
fn test_malformed_json_is_invalid() {
    let temp = TempDir::new().unwrap();
    write_config(temp.path(), CONFIG_FILE_NAME, r#"{ "jsEntry": "#);

    let err = ConfigFile::load(Some(&temp.path().join(CONFIG_FILE_NAME))).unwrap_err();
    assert!(matches!(
        err,
        CliError::Config(ConfigError::Invalid { .. })
    ));
}

#[test]
#[serial]
fn test_environment_overrides_file() {
    let temp = TempDir::new().unwrap();
    write_config(
        temp.path(),
        CONFIG_FILE_NAME,
        r#"{ "jsEntry": "lib/index.js", "dest": "dist/index.jsx", "devConnectPort": 8090 }"#,
    );

    unsafe {
        std::env::set_var("JSXBRIDGE_DEV_CONNECT_PORT", "9001");
        std::env::set_var("JSXBRIDGE_MINIFY", "true");
    }
    let result = ConfigFile::load(Some(&temp.path().join(CONFIG_FILE_NAME)));
    unsafe {
        std::env::remove_var("JSXBRIDGE_DEV_CONNECT_PORT");
        std::env::remove_var("JSXBRIDGE_MINIFY");
    }

    let file = result.unwrap();
    assert_eq!(file.config.dev_connect_port, Some(9001));
    assert!(file.config.minify);
}
