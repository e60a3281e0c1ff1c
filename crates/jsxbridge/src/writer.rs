//! Artifact writing.
//!
//! The bundle stream is staged into a temporary file next to the destination, optionally
//! minified in place, and then renamed over the destination. `rename()` is atomic on the
//! same file system, so the host application never evaluates a half-written script.

use crate::bundler::BundleStream;
use crate::{Error, Result};
use oxc_allocator::Allocator;
use oxc_codegen::{Codegen, CodegenOptions};
use oxc_minifier::{MangleOptions, Minifier as OxcMinifierPass, MinifierOptions};
use oxc_parser::Parser;
use oxc_span::SourceType;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tokio_stream::StreamExt;

/// A script minifier.
pub trait Minifier: Send + Sync + std::fmt::Debug {
    /// Minify `code`, returning the minified script.
    fn minify(&self, code: &str) -> Result<String>;
}

/// Minifier backed by oxc.
///
/// Parses the artifact as a classic script, mangles local names and prints without
/// whitespace. Syntax-level compression is off: its output may use constructs older host
/// runtimes reject.
#[derive(Debug, Clone, Copy, Default)]
pub struct OxcMinifier;

impl Minifier for OxcMinifier {
    fn minify(&self, code: &str) -> Result<String> {
        let allocator = Allocator::default();
        let ret = Parser::new(&allocator, code, SourceType::cjs()).parse();

        if ret.panicked || !ret.errors.is_empty() {
            let message = ret
                .errors
                .first()
                .map(|e| e.to_string())
                .unwrap_or_else(|| "parser aborted".to_string());
            return Err(Error::Minify(message));
        }

        let mut program = ret.program;
        let options = MinifierOptions {
            mangle: Some(MangleOptions::default()),
            compress: None,
            ..Default::default()
        };
        let minified = OxcMinifierPass::new(options).minify(&allocator, &mut program);

        Ok(Codegen::new()
            .with_options(CodegenOptions::minify())
            .with_scoping(minified.scoping)
            .build(&program)
            .code)
    }
}

/// The artifact on disk after a write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub path: PathBuf,
    /// Final size in bytes.
    pub size: u64,
    pub minified: bool,
    /// Set when minification was requested but failed; the artifact is unminified.
    pub minify_error: Option<String>,
}

/// Writes bundle streams to their destination.
#[derive(Debug, Clone)]
pub struct BuildWriter {
    minifier: Arc<dyn Minifier>,
}

impl Default for BuildWriter {
    fn default() -> Self {
        Self::new(Arc::new(OxcMinifier))
    }
}

impl BuildWriter {
    pub fn new(minifier: Arc<dyn Minifier>) -> Self {
        Self { minifier }
    }

    /// Consume `stream` into `dest`, minifying when asked.
    ///
    /// On error the previous artifact at `dest` is left untouched.
    pub async fn write(
        &self,
        mut stream: BundleStream,
        dest: &Path,
        minify: bool,
    ) -> Result<Artifact> {
        tracing::debug!("-> write {}", dest.display());

        let dir = dest
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        tokio::fs::create_dir_all(dir).await.map_err(|e| {
            Error::WriteFailure(format!(
                "Failed to create output directory '{}': {}",
                dir.display(),
                e
            ))
        })?;

        let staged = tempfile::Builder::new()
            .prefix(".jsxbridge-")
            .suffix(".tmp")
            .tempfile_in(dir)
            .map_err(|e| {
                Error::WriteFailure(format!("Failed to stage '{}': {}", dest.display(), e))
            })?;

        let mut file = tokio::fs::File::from_std(staged.as_file().try_clone()?);
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| Error::Bundle(format!("Bundle stream failed: {}", e)))?;
            file.write_all(&chunk).await.map_err(|e| {
                Error::WriteFailure(format!("Failed to write '{}': {}", dest.display(), e))
            })?;
        }
        file.flush().await?;
        file.sync_all().await?;
        drop(file);

        let mut minified = false;
        let mut minify_error = None;
        if minify {
            let code = tokio::fs::read_to_string(staged.path()).await?;
            match self.minifier.minify(&code) {
                Ok(out) => {
                    tokio::fs::write(staged.path(), out).await.map_err(|e| {
                        Error::WriteFailure(format!(
                            "Failed to write minified '{}': {}",
                            dest.display(),
                            e
                        ))
                    })?;
                    minified = true;
                }
                Err(e) => {
                    tracing::warn!("Minification failed, keeping unminified output: {}", e);
                    minify_error = Some(e.to_string());
                }
            }
        }

        let staged_path = staged.path().to_path_buf();
        staged.persist(dest).map_err(|e| {
            Error::WriteFailure(format!(
                "Failed to rename '{}' to '{}': {}",
                staged_path.display(),
                dest.display(),
                e.error
            ))
        })?;

        let size = tokio::fs::metadata(dest).await?.len();
        Ok(Artifact {
            path: dest.to_path_buf(),
            size,
            minified,
            minify_error,
        })
    }
}
