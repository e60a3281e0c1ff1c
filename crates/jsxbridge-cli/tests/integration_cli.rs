//! End-to-end tests for the `jsxbridge` binary.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn jsxbridge(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("jsxbridge").unwrap();
    cmd.current_dir(dir.path()).env("NO_COLOR", "1");
    cmd
}

#[test]
fn test_help_lists_commands() {
    let temp = TempDir::new().unwrap();
    jsxbridge(&temp)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("build"))
        .stdout(predicate::str::contains("watch"));
}

#[test]
fn test_build_without_config_fails() {
    let temp = TempDir::new().unwrap();
    jsxbridge(&temp)
        .arg("build")
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "Cannot find config file in your project directory, expected it here:",
        ))
        .stderr(predicate::str::contains("jsxbridge.config.json"));
}

#[test]
fn test_default_watch_without_config_fails() {
    let temp = TempDir::new().unwrap();
    jsxbridge(&temp)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Cannot find config file"));
}

#[test]
fn test_lone_argument_is_config_path() {
    let temp = TempDir::new().unwrap();
    jsxbridge(&temp)
        .arg("custom.config.json")
        .assert()
        .failure()
        .stderr(predicate::str::contains("custom.config.json"));
}

#[test]
fn test_invalid_config_fails() {
    let temp = TempDir::new().unwrap();
    fs::write(
        temp.path().join("jsxbridge.config.json"),
        r#"{ "jsEntry": "lib/index.js", "dest": "dist/index.jsx", "entry": ["x"] }"#,
    )
    .unwrap();

    jsxbridge(&temp)
        .arg("build")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid config file"));
}

#[test]
fn test_watch_requires_reload_target() {
    let temp = TempDir::new().unwrap();
    fs::write(
        temp.path().join("jsxbridge.config.json"),
        r#"{ "jsEntry": "lib/index.js", "dest": "dist/index.jsx" }"#,
    )
    .unwrap();

    jsxbridge(&temp)
        .arg("watch")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Missing required field"));
}

#[test]
fn test_conflicting_targets_fail() {
    let temp = TempDir::new().unwrap();
    fs::write(
        temp.path().join("jsxbridge.config.json"),
        r#"{
            "jsEntry": "lib/index.js",
            "dest": "dist/index.jsx",
            "app": "Adobe Illustrator",
            "devConnectPort": 8090
        }"#,
    )
    .unwrap();

    jsxbridge(&temp)
        .arg("build")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Conflicting options"));
}

#[cfg(unix)]
#[test]
fn test_build_writes_artifact() {
    use std::os::unix::fs::PermissionsExt;

    let temp = TempDir::new().unwrap();
    fs::create_dir_all(temp.path().join("lib")).unwrap();
    fs::write(temp.path().join("lib/index.js"), "$.writeln('hello');\n").unwrap();

    // stands in for esbuild: prints the entry module
    let bundler = temp.path().join("fake-esbuild");
    fs::write(&bundler, "#!/bin/sh\ncat \"$1\"\n").unwrap();
    fs::set_permissions(&bundler, fs::Permissions::from_mode(0o755)).unwrap();

    let config = serde_json::json!({
        "jsEntry": "lib/index.js",
        "dest": "dist/index.jsx",
        "bundler": bundler,
    });
    fs::write(
        temp.path().join("jsxbridge.config.json"),
        serde_json::to_string_pretty(&config).unwrap(),
    )
    .unwrap();

    jsxbridge(&temp)
        .arg("build")
        .assert()
        .success()
        .stderr(predicate::str::contains("Build complete"));

    let written = fs::read_to_string(temp.path().join("dist/index.jsx")).unwrap();
    assert_eq!(written, "var globalThis = this;\n$.writeln('hello');\n");
}

#[cfg(unix)]
#[test]
fn test_build_reports_bundle_failure() {
    use std::os::unix::fs::PermissionsExt;

    let temp = TempDir::new().unwrap();
    let bundler = temp.path().join("fake-esbuild");
    fs::write(
        &bundler,
        "#!/bin/sh\necho 'lib/index.js:1:0: ERROR: Unexpected end of file' >&2\nexit 1\n",
    )
    .unwrap();
    fs::set_permissions(&bundler, fs::Permissions::from_mode(0o755)).unwrap();

    let config = serde_json::json!({
        "jsEntry": "lib/index.js",
        "dest": "dist/index.jsx",
        "bundler": bundler,
    });
    fs::write(
        temp.path().join("jsxbridge.config.json"),
        config.to_string(),
    )
    .unwrap();

    jsxbridge(&temp)
        .arg("build")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unexpected end of file"));
    assert!(!temp.path().join("dist/index.jsx").exists());
}

#[test]
fn test_init_writes_loadable_example_config() {
    let temp = TempDir::new().unwrap();
    jsxbridge(&temp)
        .arg("init")
        .assert()
        .success()
        .stderr(predicate::str::contains("jsxbridge.config.json"));

    let written = fs::read_to_string(temp.path().join("jsxbridge.config.json")).unwrap();
    let config: jsxbridge_cli::config::JsxbridgeConfig = serde_json::from_str(&written).unwrap();
    assert!(config.validate().is_ok());
    assert_eq!(config.app.as_deref(), Some("Adobe InDesign 2024"));
}

#[test]
fn test_init_keeps_existing_config_without_force() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("jsxbridge.config.json");
    fs::write(&path, "{}").unwrap();

    jsxbridge(&temp)
        .arg("init")
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
    assert_eq!(fs::read_to_string(&path).unwrap(), "{}");

    jsxbridge(&temp).args(["init", "--force"]).assert().success();
    assert!(fs::read_to_string(&path).unwrap().contains("\"jsEntry\""));
}

#[test]
fn test_init_into_missing_directory_fails() {
    let temp = TempDir::new().unwrap();
    jsxbridge(&temp)
        .args(["init", "no-such-dir"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("File not found"));
}

#[test]
fn test_schema_prints_config_schema() {
    let temp = TempDir::new().unwrap();
    let output = jsxbridge(&temp).arg("schema").assert().success();
    let stdout = String::from_utf8(output.get_output().stdout.clone()).unwrap();
    let schema: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert!(schema["properties"]["jsEntry"].is_object());
    assert!(schema["properties"]["devConnectPort"].is_object());
}
