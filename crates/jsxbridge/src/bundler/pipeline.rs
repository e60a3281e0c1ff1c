use super::{Bundler, substitute_env};
use crate::{BuildConfig, Result};
use std::collections::BTreeMap;
use std::fmt;
use std::io;
use std::path::PathBuf;
use std::pin::Pin;
use std::sync::Arc;
use tokio_stream::Stream;

/// Prepended to every bundle. Host runtimes predate `globalThis`.
pub const PRELUDE: &str = "var globalThis = this;\n";

/// Byte chunks of a bundled script, in order.
pub type BundleStream = Pin<Box<dyn Stream<Item = io::Result<Vec<u8>>> + Send>>;

/// One bundler run: the script as a stream plus the modules it was built from.
pub struct Bundle {
    pub stream: BundleStream,
    pub inputs: Vec<PathBuf>,
}

impl fmt::Debug for Bundle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bundle")
            .field("inputs", &self.inputs)
            .finish_non_exhaustive()
    }
}

/// Prelude + bundler + environment substitution.
#[derive(Debug, Clone)]
pub struct BundlePipeline {
    bundler: Arc<dyn Bundler>,
    entry: PathBuf,
    cwd: PathBuf,
    env: BTreeMap<String, String>,
}

impl BundlePipeline {
    pub fn new(
        bundler: Arc<dyn Bundler>,
        config: &BuildConfig,
        env: BTreeMap<String, String>,
    ) -> Self {
        Self {
            bundler,
            entry: config.js_entry_path(),
            cwd: config.root.clone(),
            env,
        }
    }

    /// Entry module this pipeline bundles.
    pub fn entry(&self) -> &PathBuf {
        &self.entry
    }

    /// Run the bundler and return the finished script as a stream.
    pub async fn bundle(&self) -> Result<Bundle> {
        tracing::debug!("-> bundle {}", self.entry.display());
        let output = self.bundler.bundle(&self.entry, &self.cwd).await?;
        let code = substitute_env(&output.code, &self.env);

        let chunks: Vec<io::Result<Vec<u8>>> =
            vec![Ok(PRELUDE.as_bytes().to_vec()), Ok(code.into_bytes())];

        Ok(Bundle {
            stream: Box::pin(tokio_stream::iter(chunks)),
            inputs: output.inputs,
        })
    }
}
