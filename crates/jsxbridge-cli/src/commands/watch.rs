//! `jsxbridge watch`.
//!
//! Starts a [`WatchSession`]: log server, compiler in watch mode, initial build and
//! reload, then rebuilds on every input change until Ctrl+C.

use crate::cli::WatchArgs;
use crate::commands::load_config;
use crate::error::Result;
use crate::ui;
use jsxbridge::{BuildStatus, SessionOptions, TerminalSink, WatchSession};
use std::sync::Arc;
use tokio::signal;

/// Execute the watch command.
///
/// Only config problems, a log server that cannot bind and a watcher that cannot start
/// are errors. Build and delivery failures are reported and the session keeps going.
pub async fn execute(args: WatchArgs) -> Result<()> {
    let file = load_config(args.config.as_deref())?;
    let target = file.config.require_reload_target()?;
    let config = Arc::new(file.config.to_build_config(file.root()));

    ui::info(&format!("Config: {}", file.path.display()));
    ui::info(&format!("Reload target: {}", target.describe()));

    let options = SessionOptions {
        sink: Arc::new(TerminalSink::new(ui::colors_enabled())),
        ..Default::default()
    };
    let session = WatchSession::start_with(config, options).await?;

    if let Some(addr) = session.log_server_addr() {
        ui::info(&format!("Log server listening on http://{}", addr));
    }
    match session.status() {
        BuildStatus::Success { duration_ms } => {
            ui::success(&format!("Initial build completed in {}ms", duration_ms))
        }
        BuildStatus::Failed { error } => ui::error(&format!("Initial build failed: {}", error)),
        BuildStatus::NotStarted | BuildStatus::InProgress => {}
    }

    ui::info("Watching for changes. Press Ctrl+C to stop");
    session.run_until(shutdown_signal()).await;

    ui::success("Watch session stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        tracing::warn!("Unable to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
    ui::info("Shutting down...");
}
