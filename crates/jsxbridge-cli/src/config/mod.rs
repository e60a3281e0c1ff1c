//! Configuration file handling.
//!
//! `jsxbridge.config.json` lives in the project root (or anywhere, passed on the command
//! line). Sources are merged by figment, lowest priority first: field defaults, the file,
//! then `JSXBRIDGE_*` environment variables (`JSXBRIDGE_DEV_CONNECT_PORT=9000` sets
//! `devConnectPort`).

mod conversions;
mod defaults;
mod loading;
mod validation;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub use defaults::*;
pub use loading::{CONFIG_FILE_NAME, ConfigFile, env_key_to_field};

/// jsxbridge configuration, as written in `jsxbridge.config.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct JsxbridgeConfig {
    /// TypeScript project (tsconfig.json). Omit to skip compilation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ts_entry: Option<PathBuf>,

    /// Bundler entry module, usually the compiler's output
    pub js_entry: PathBuf,

    /// Where the bundled script is written
    pub dest: PathBuf,

    /// Minify the bundled script
    #[serde(default)]
    pub minify: bool,

    /// Application to reload through the OS automation bridge (e.g. "Adobe InDesign 2024")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app: Option<String>,

    /// Host of the companion extension
    #[serde(default = "default_dev_connect_host")]
    pub dev_connect_host: String,

    /// Port of the companion extension. Mutually exclusive with `app`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dev_connect_port: Option<u16>,

    /// Port for the log server that receives runtime errors from the host
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_server_port: Option<u16>,

    /// Compiler executable (default: node_modules/.bin/tsc, then tsc on PATH)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compiler: Option<PathBuf>,

    /// Bundler executable (default: node_modules/.bin/esbuild, then esbuild on PATH)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bundler: Option<PathBuf>,
}

impl JsxbridgeConfig {
    /// Minimal configuration with the given entry and destination.
    pub fn new(js_entry: impl Into<PathBuf>, dest: impl Into<PathBuf>) -> Self {
        Self {
            ts_entry: None,
            js_entry: js_entry.into(),
            dest: dest.into(),
            minify: false,
            app: None,
            dev_connect_host: default_dev_connect_host(),
            dev_connect_port: None,
            log_server_port: None,
            compiler: None,
            bundler: None,
        }
    }

    /// JSON Schema for `jsxbridge.config.json`.
    pub fn json_schema() -> serde_json::Value {
        schemars::schema_for!(JsxbridgeConfig).to_value()
    }

    /// Example `jsxbridge.config.json` content.
    pub fn example_config() -> crate::Result<String> {
        let example = Self {
            ts_entry: Some(PathBuf::from("tsconfig.json")),
            app: Some("Adobe InDesign 2024".to_string()),
            log_server_port: Some(default_log_server_port()),
            ..Self::new("lib/index.js", "dist/index.jsx")
        };
        Ok(serde_json::to_string_pretty(&example)?)
    }
}
