//! Type compiler adapter.
//!
//! Runs the external compiler (`tsc` by default) either once, for `build`, or as a
//! long-lived `--watch` subprocess that shares the terminal with the orchestrator. Compiler
//! diagnostics are never fatal: the bundler works on whatever JavaScript the compiler last
//! emitted.

use crate::{BuildConfig, Error, Result};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::{Child, Command};

/// Result of a one-shot compile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompileOutcome {
    /// The compiler exited successfully.
    Success,
    /// No compiler project is configured.
    Skipped,
    /// The compiler failed or could not be started; the text is its output.
    Diagnostics(String),
}

impl CompileOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, CompileOutcome::Success)
    }
}

/// Resolve a Node tool: prefer the project's `node_modules/.bin`, fall back to `PATH`.
pub fn resolve_tool(root: &Path, name: &str, explicit: Option<&Path>) -> PathBuf {
    if let Some(explicit) = explicit {
        return explicit.to_path_buf();
    }

    let bin_name = if cfg!(windows) {
        format!("{}.cmd", name)
    } else {
        name.to_string()
    };

    let local = root.join("node_modules").join(".bin").join(&bin_name);
    if local.is_file() {
        local
    } else {
        PathBuf::from(bin_name)
    }
}

/// Invokes the compiler for one configuration.
#[derive(Debug, Clone)]
pub struct CompilerAdapter {
    program: PathBuf,
    project: Option<PathBuf>,
    root: PathBuf,
    env: BTreeMap<String, String>,
}

impl CompilerAdapter {
    /// Create an adapter for `config`, passing `env` to every compiler process.
    pub fn new(config: &BuildConfig, env: BTreeMap<String, String>) -> Self {
        Self {
            program: resolve_tool(&config.root, "tsc", config.tools.compiler.as_deref()),
            project: config.ts_entry_path(),
            root: config.root.clone(),
            env,
        }
    }

    /// The compiler executable in use.
    pub fn program(&self) -> &Path {
        &self.program
    }

    fn command(&self, project: &Path, watch: bool) -> Command {
        let mut cmd = Command::new(&self.program);
        if watch {
            cmd.arg("--watch");
        }
        cmd.arg("--project")
            .arg(project)
            .current_dir(&self.root)
            .envs(&self.env);
        cmd
    }

    /// Compile once and wait for the compiler to exit.
    pub async fn compile_once(&self) -> CompileOutcome {
        let Some(project) = &self.project else {
            return CompileOutcome::Skipped;
        };
        tracing::debug!("-> compile {}", project.display());

        let output = self
            .command(project, false)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await;

        match output {
            Ok(output) if output.status.success() => CompileOutcome::Success,
            Ok(output) => {
                let mut text = String::from_utf8_lossy(&output.stdout).trim_end().to_string();
                let stderr = String::from_utf8_lossy(&output.stderr);
                if !stderr.trim().is_empty() {
                    if !text.is_empty() {
                        text.push('\n');
                    }
                    text.push_str(stderr.trim_end());
                }
                if text.is_empty() {
                    text = format!("{} exited with {}", self.program.display(), output.status);
                }
                CompileOutcome::Diagnostics(text)
            }
            Err(e) => CompileOutcome::Diagnostics(format!(
                "Failed to run {}: {}",
                self.program.display(),
                e
            )),
        }
    }

    /// Start the compiler in watch mode.
    ///
    /// The child inherits the terminal so diagnostics stream live. Returns `Ok(None)` when no
    /// compiler project is configured.
    pub fn compile_watch(&self) -> Result<Option<CompilerHandle>> {
        let Some(project) = &self.project else {
            return Ok(None);
        };
        tracing::debug!("-> compile --watch {}", project.display());

        let child = self
            .command(project, true)
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                Error::Compile(format!("Failed to start {}: {}", self.program.display(), e))
            })?;

        Ok(Some(CompilerHandle { child }))
    }
}

/// Handle to the watch-mode compiler. Dropping it kills the process.
#[derive(Debug)]
pub struct CompilerHandle {
    child: Child,
}

impl CompilerHandle {
    /// Kill the compiler and reap it.
    pub async fn stop(mut self) {
        if let Err(e) = self.child.kill().await {
            tracing::debug!("compiler already stopped: {}", e);
        }
    }
}
