//! Build and watch orchestration.
//!
//! `run_build` compiles once, bundles and writes. A [`WatchSession`] owns everything a watch
//! run needs: the compiler subprocess, the log server, the reload worker and the dependency
//! watcher, and rebuilds whenever an input changes.

use crate::bundler::{BundlePipeline, Bundler, EsbuildBundler};
use crate::compiler::{CompileOutcome, CompilerAdapter, CompilerHandle};
use crate::log_server::{LogServer, LogServerHandle, LogSink, TerminalSink};
use crate::reload::{ErrorChannel, ReloadDispatcher, ReloadTransport, ReloadWorker};
use crate::watcher::{DEFAULT_DEBOUNCE, DependencyWatcher, normalize};
use crate::writer::{Artifact, BuildWriter, Minifier, OxcMinifier};
use crate::{BuildConfig, LOG_SERVER_PORT_ENV, Result};
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::future::Future;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

/// Environment for the compiler and the substitution pass: the process environment plus
/// the log server port, when there is one.
pub fn session_env(log_server_port: Option<u16>) -> BTreeMap<String, String> {
    let mut env: BTreeMap<String, String> = std::env::vars().collect();
    if let Some(port) = log_server_port {
        env.insert(LOG_SERVER_PORT_ENV.to_string(), port.to_string());
    }
    env
}

/// Collaborators a session or build uses. Defaults are the real tools.
#[derive(Debug, Clone)]
pub struct SessionOptions {
    /// Bundler; `None` runs esbuild.
    pub bundler: Option<Arc<dyn Bundler>>,
    /// Reload transport; `None` derives it from the configured reload target.
    pub transport: Option<Arc<dyn ReloadTransport>>,
    pub minifier: Arc<dyn Minifier>,
    /// Receives log server records and bridge output.
    pub sink: Arc<dyn LogSink>,
    pub debounce: Duration,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            bundler: None,
            transport: None,
            minifier: Arc::new(OxcMinifier),
            sink: Arc::new(TerminalSink::default()),
            debounce: DEFAULT_DEBOUNCE,
        }
    }
}

impl SessionOptions {
    fn bundler_for(&self, config: &BuildConfig) -> Arc<dyn Bundler> {
        match &self.bundler {
            Some(bundler) => Arc::clone(bundler),
            None => Arc::new(EsbuildBundler::new(
                &config.root,
                config.tools.bundler.as_deref(),
            )),
        }
    }
}

/// State of the most recent build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildStatus {
    NotStarted,
    InProgress,
    Success { duration_ms: u64 },
    Failed { error: String },
}

impl BuildStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, BuildStatus::Success { .. })
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            BuildStatus::Failed { error } => Some(error),
            _ => None,
        }
    }
}

/// Result of `run_build`.
#[derive(Debug, Clone)]
pub struct BuildReport {
    pub compile: CompileOutcome,
    pub artifact: Artifact,
    pub duration_ms: u64,
}

/// Bundle then write.
#[derive(Debug, Clone)]
struct Builder {
    pipeline: BundlePipeline,
    writer: BuildWriter,
    dest: PathBuf,
    minify: bool,
}

impl Builder {
    fn new(config: &BuildConfig, options: &SessionOptions, env: BTreeMap<String, String>) -> Self {
        Self {
            pipeline: BundlePipeline::new(options.bundler_for(config), config, env),
            writer: BuildWriter::new(Arc::clone(&options.minifier)),
            dest: config.dest_path(),
            minify: config.minify,
        }
    }

    async fn build(&self) -> Result<(Artifact, Vec<PathBuf>)> {
        let bundle = self.pipeline.bundle().await?;
        let artifact = self.writer.write(bundle.stream, &self.dest, self.minify).await?;
        Ok((artifact, bundle.inputs))
    }
}

fn report_compile(outcome: &CompileOutcome) {
    match outcome {
        CompileOutcome::Success => tracing::debug!("compile succeeded"),
        CompileOutcome::Skipped => tracing::debug!("no tsEntry, compile skipped"),
        CompileOutcome::Diagnostics(text) => tracing::warn!("{}", text),
    }
}

/// One-shot build: compile, bundle, write. No reload.
///
/// Compiler diagnostics are reported but do not stop the build.
pub async fn run_build(config: &BuildConfig) -> Result<BuildReport> {
    run_build_with(config, &SessionOptions::default()).await
}

/// [`run_build`] with explicit collaborators.
pub async fn run_build_with(
    config: &BuildConfig,
    options: &SessionOptions,
) -> Result<BuildReport> {
    tracing::debug!("-> build");
    let started = Instant::now();
    // no log server in build mode
    let env = session_env(None);

    let compile = CompilerAdapter::new(config, env.clone()).compile_once().await;
    report_compile(&compile);

    let (artifact, _) = Builder::new(config, options, env).build().await?;
    Ok(BuildReport {
        compile,
        artifact,
        duration_ms: started.elapsed().as_millis() as u64,
    })
}

/// A running watch-mode session.
pub struct WatchSession {
    config: Arc<BuildConfig>,
    builder: Builder,
    compiler: Option<CompilerHandle>,
    log_server: Option<LogServerHandle>,
    dispatcher: Option<Arc<ReloadDispatcher>>,
    worker: Option<ReloadWorker>,
    watcher: DependencyWatcher,
    changes: mpsc::Receiver<PathBuf>,
    status: Arc<RwLock<BuildStatus>>,
    debounce: Duration,
}

impl std::fmt::Debug for WatchSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatchSession")
            .field("dest", &self.builder.dest)
            .field("log_server", &self.log_server_addr())
            .field("status", &*self.status.read())
            .finish_non_exhaustive()
    }
}

impl WatchSession {
    /// Start a session with the real tools.
    pub async fn start(config: Arc<BuildConfig>) -> Result<Self> {
        Self::start_with(config, SessionOptions::default()).await
    }

    /// Start a session.
    ///
    /// Startup order: log server, one-shot compile, compiler in watch mode, reload worker,
    /// watcher, initial build. Only a failure to bind the log server or create the watcher
    /// is an error. A compiler that will not start or a failed initial build is reported
    /// and the session keeps watching.
    pub async fn start_with(config: Arc<BuildConfig>, options: SessionOptions) -> Result<Self> {
        tracing::debug!("-> watch");

        let log_server = match config.log_server_port {
            Some(port) => Some(LogServer::start(port, Arc::clone(&options.sink)).await?),
            None => None,
        };
        let port = log_server.as_ref().map(LogServerHandle::port);
        let env = session_env(port);

        let compiler = CompilerAdapter::new(&config, env.clone());
        report_compile(&compiler.compile_once().await);
        let compiler = match compiler.compile_watch() {
            Ok(handle) => handle,
            Err(e) => {
                tracing::warn!("{}", e);
                None
            }
        };

        let dispatcher = match (&options.transport, &config.reload) {
            (Some(transport), target) => Some(ReloadDispatcher::new(
                Arc::clone(transport),
                ErrorChannel::for_target(target.as_ref(), port),
            )),
            (None, Some(target)) => Some(ReloadDispatcher::for_target(
                target,
                port,
                Arc::clone(&options.sink),
            )),
            (None, None) => None,
        }
        .map(Arc::new);
        let worker = dispatcher.clone().map(ReloadWorker::spawn);

        let (watcher, changes) = DependencyWatcher::new(options.debounce)?;
        let builder = Builder::new(&config, &options, env);

        let mut session = Self {
            config,
            builder,
            compiler,
            log_server,
            dispatcher,
            worker,
            watcher,
            changes,
            status: Arc::new(RwLock::new(BuildStatus::NotStarted)),
            debounce: options.debounce,
        };
        session.rebuild().await;
        Ok(session)
    }

    pub fn config(&self) -> &BuildConfig {
        &self.config
    }

    /// Address of the log server, if one is running.
    pub fn log_server_addr(&self) -> Option<SocketAddr> {
        self.log_server.as_ref().map(LogServerHandle::local_addr)
    }

    pub fn status(&self) -> BuildStatus {
        self.status.read().clone()
    }

    /// Directories the dependency watcher currently watches.
    pub fn watched_dirs(&self) -> Vec<PathBuf> {
        self.watcher.watched_dirs()
    }

    fn entry_dir(&self) -> PathBuf {
        let entry = self.config.js_entry_path();
        entry
            .parent()
            .filter(|dir| dir.is_dir())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.config.root.clone())
    }

    /// Bundle, write and queue a reload. Never fails; errors are reported and the previous
    /// artifact stays in place.
    pub async fn rebuild(&mut self) -> BuildStatus {
        *self.status.write() = BuildStatus::InProgress;
        let started = Instant::now();

        let status = match self.builder.build().await {
            Ok((artifact, inputs)) => {
                let duration_ms = started.elapsed().as_millis() as u64;
                tracing::info!(
                    "Built {} ({} bytes) in {}ms",
                    artifact.path.display(),
                    artifact.size,
                    duration_ms
                );

                let fallback = self.entry_dir();
                if let Err(e) = self.watcher.update(&inputs, &fallback) {
                    tracing::warn!("Failed to watch bundle inputs: {}", e);
                }

                if let (Some(dispatcher), Some(worker)) = (&self.dispatcher, &self.worker) {
                    worker.enqueue(dispatcher.payload(&artifact.path));
                }
                BuildStatus::Success { duration_ms }
            }
            Err(e) => {
                tracing::error!("{}", e);
                if self.watcher.watched_dirs().is_empty() {
                    let fallback = self.entry_dir();
                    if let Err(e) = self.watcher.update(&[], &fallback) {
                        tracing::warn!("Failed to watch {}: {}", fallback.display(), e);
                    }
                }
                BuildStatus::Failed {
                    error: e.to_string(),
                }
            }
        };

        *self.status.write() = status.clone();
        status
    }

    /// Wait for the next relevant change, then let the burst settle.
    ///
    /// Returns `None` when the watcher has gone away.
    async fn next_change(&mut self, dest: &Path) -> Option<PathBuf> {
        loop {
            let changed = self.changes.recv().await?;
            if changed == dest {
                continue;
            }

            tokio::time::sleep(self.debounce).await;
            while let Ok(more) = self.changes.try_recv() {
                tracing::trace!("coalesced change {}", more.display());
            }
            return Some(changed);
        }
    }

    /// Rebuild on every change until `shutdown` resolves, then stop.
    pub async fn run_until<F>(mut self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        let dest = normalize(&self.builder.dest);
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                change = self.next_change(&dest) => match change {
                    Some(path) => {
                        tracing::info!("Changed: {}", path.display());
                        self.rebuild().await;
                    }
                    None => {
                        tracing::warn!("File watcher stopped");
                        break;
                    }
                },
            }
        }

        self.stop().await;
    }

    /// Kill the compiler, stop the log server and abandon pending reloads.
    pub async fn stop(mut self) {
        if let Some(worker) = self.worker.take() {
            worker.abort();
        }
        if let Some(compiler) = self.compiler.take() {
            compiler.stop().await;
        }
        if let Some(server) = self.log_server.take() {
            server.stop().await;
        }
        tracing::debug!("session stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_env_adds_port() {
        let env = session_env(Some(8123));
        assert_eq!(env.get(LOG_SERVER_PORT_ENV).map(String::as_str), Some("8123"));
        assert!(env.contains_key("PATH") || std::env::var("PATH").is_err());
    }

    #[test]
    fn test_build_status_helpers() {
        assert!(BuildStatus::Success { duration_ms: 3 }.is_success());
        let failed = BuildStatus::Failed {
            error: "Bundle error".to_string(),
        };
        assert_eq!(failed.error(), Some("Bundle error"));
        assert!(BuildStatus::NotStarted.error().is_none());
    }
}
