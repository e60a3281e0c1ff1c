//! Per-invocation build configuration.
//!
//! `BuildConfig` is immutable once a build or watch session starts. The CLI loads it from
//! `jsxbridge.config.json`; library users construct it with the builder methods below.

use path_clean::PathClean;
use std::path::{Path, PathBuf};

/// Where the rebuilt script is delivered after each successful write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReloadTarget {
    /// Inject through the OS automation bridge into the named application.
    AutomationBridge {
        /// Application name as the automation shell knows it (e.g. "Adobe Photoshop 2024").
        app: String,
    },
    /// POST the script to a companion extension listening inside the host.
    NetworkPush {
        /// Companion listener host.
        host: String,
        /// Companion listener port.
        port: u16,
    },
}

impl ReloadTarget {
    /// Human readable description used in progress output.
    pub fn describe(&self) -> String {
        match self {
            ReloadTarget::AutomationBridge { app } => format!("automation bridge -> {}", app),
            ReloadTarget::NetworkPush { host, port } => format!("http://{}:{}", host, port),
        }
    }
}

/// Explicit tool commands, overriding `node_modules/.bin` lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolOverrides {
    /// Type compiler executable (default: `tsc`).
    pub compiler: Option<PathBuf>,
    /// Bundler executable (default: `esbuild`).
    pub bundler: Option<PathBuf>,
}

/// Configuration for a single `build` or `watch` invocation.
#[derive(Debug, Clone)]
pub struct BuildConfig {
    /// Project root; relative paths resolve against it.
    pub root: PathBuf,
    /// Compiler project (tsconfig) path. `None` skips the compile step.
    pub ts_entry: Option<PathBuf>,
    /// Bundler entry module (compiler output).
    pub js_entry: PathBuf,
    /// Artifact destination.
    pub dest: PathBuf,
    /// Minify the artifact after writing.
    pub minify: bool,
    /// Delivery strategy for watch mode. `None` disables live reload.
    pub reload: Option<ReloadTarget>,
    /// Port for the log ingestion server.
    pub log_server_port: Option<u16>,
    /// Tool command overrides.
    pub tools: ToolOverrides,
}

impl BuildConfig {
    /// Create a configuration rooted at the current directory.
    pub fn new(js_entry: impl Into<PathBuf>, dest: impl Into<PathBuf>) -> Self {
        Self {
            root: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            ts_entry: None,
            js_entry: js_entry.into(),
            dest: dest.into(),
            minify: false,
            reload: None,
            log_server_port: None,
            tools: ToolOverrides::default(),
        }
    }

    /// Set the project root.
    pub fn root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = root.into();
        self
    }

    /// Set the compiler project path.
    pub fn ts_entry(mut self, ts_entry: impl Into<PathBuf>) -> Self {
        self.ts_entry = Some(ts_entry.into());
        self
    }

    /// Enable or disable minification.
    pub fn minify(mut self, minify: bool) -> Self {
        self.minify = minify;
        self
    }

    /// Set the reload target.
    pub fn reload(mut self, target: ReloadTarget) -> Self {
        self.reload = Some(target);
        self
    }

    /// Set the log server port.
    pub fn log_server_port(mut self, port: u16) -> Self {
        self.log_server_port = Some(port);
        self
    }

    /// Set tool overrides.
    pub fn tools(mut self, tools: ToolOverrides) -> Self {
        self.tools = tools;
        self
    }

    /// Resolve a path against the project root.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf().clean()
        } else {
            self.root.join(path).clean()
        }
    }

    /// Absolute bundler entry.
    pub fn js_entry_path(&self) -> PathBuf {
        self.resolve(&self.js_entry)
    }

    /// Absolute artifact destination.
    pub fn dest_path(&self) -> PathBuf {
        self.resolve(&self.dest)
    }

    /// Absolute compiler project path, if configured.
    pub fn ts_entry_path(&self) -> Option<PathBuf> {
        self.ts_entry.as_deref().map(|p| self.resolve(p))
    }
}
