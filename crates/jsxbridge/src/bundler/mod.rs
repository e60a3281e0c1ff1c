//! Bundling.
//!
//! The module bundler itself is an external tool behind the [`Bundler`] trait. The
//! [`BundlePipeline`] wraps it with the global-scope prelude and the environment substitution
//! pass, and hands the result to the writer as a byte stream.

mod env;
mod pipeline;

pub use env::substitute_env;
pub use pipeline::{Bundle, BundlePipeline, BundleStream, PRELUDE};

use crate::compiler::resolve_tool;
use crate::{Error, Result};
use async_trait::async_trait;
use path_clean::PathClean;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;

/// Output of one bundler run.
#[derive(Debug, Clone, Default)]
pub struct BundleOutput {
    /// Bundled script, a single self-contained IIFE.
    pub code: String,
    /// Absolute paths of every module that went into the bundle.
    pub inputs: Vec<PathBuf>,
}

/// A module bundler.
#[async_trait]
pub trait Bundler: Send + Sync + std::fmt::Debug {
    /// Bundle `entry` into a single script, resolving modules relative to `cwd`.
    async fn bundle(&self, entry: &Path, cwd: &Path) -> Result<BundleOutput>;
}

/// Runs `esbuild` as a subprocess.
#[derive(Debug, Clone)]
pub struct EsbuildBundler {
    program: PathBuf,
}

impl EsbuildBundler {
    /// Use the `esbuild` found in `root`'s `node_modules/.bin`, on `PATH`, or `explicit`.
    pub fn new(root: &Path, explicit: Option<&Path>) -> Self {
        Self {
            program: resolve_tool(root, "esbuild", explicit),
        }
    }

    /// The bundler executable in use.
    pub fn program(&self) -> &Path {
        &self.program
    }
}

#[derive(Debug, Deserialize)]
struct Metafile {
    #[serde(default)]
    inputs: BTreeMap<String, serde_json::Value>,
}

#[async_trait]
impl Bundler for EsbuildBundler {
    async fn bundle(&self, entry: &Path, cwd: &Path) -> Result<BundleOutput> {
        let meta_dir = tempfile::tempdir()?;
        let meta_path = meta_dir.path().join("meta.json");

        let output = Command::new(&self.program)
            .arg(entry)
            .arg("--bundle")
            .arg("--format=iife")
            .arg("--log-level=warning")
            .arg(format!("--metafile={}", meta_path.display()))
            .current_dir(cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| {
                Error::Bundle(format!("Failed to run {}: {}", self.program.display(), e))
            })?;

        let stderr = String::from_utf8_lossy(&output.stderr);
        if !output.status.success() {
            let message = if stderr.trim().is_empty() {
                format!("{} exited with {}", self.program.display(), output.status)
            } else {
                stderr.trim_end().to_string()
            };
            return Err(Error::Bundle(message));
        }
        if !stderr.trim().is_empty() {
            tracing::warn!("{}", stderr.trim_end());
        }

        let code = String::from_utf8(output.stdout)
            .map_err(|e| Error::Bundle(format!("Bundle is not valid UTF-8: {}", e)))?;

        let inputs = match tokio::fs::read(&meta_path).await {
            Ok(bytes) => parse_metafile_inputs(&bytes, cwd)?,
            Err(e) => {
                tracing::debug!("no metafile from bundler: {}", e);
                Vec::new()
            }
        };

        Ok(BundleOutput { code, inputs })
    }
}

/// Extract absolute input paths from an esbuild metafile.
pub(crate) fn parse_metafile_inputs(bytes: &[u8], cwd: &Path) -> Result<Vec<PathBuf>> {
    let meta: Metafile = serde_json::from_slice(bytes)?;
    Ok(meta
        .inputs
        .keys()
        // virtual modules, e.g. `<stdin>` or `ns:path`
        .filter(|key| !key.starts_with('<') && !has_namespace(key))
        .map(|key| {
            let path = Path::new(key);
            if path.is_absolute() {
                path.to_path_buf().clean()
            } else {
                cwd.join(path).clean()
            }
        })
        .collect())
}

fn has_namespace(key: &str) -> bool {
    match key.split_once(':') {
        // `C:\...` drive letters are paths, not namespaces
        Some((prefix, _)) => prefix.len() > 1,
        None => false,
    }
}
