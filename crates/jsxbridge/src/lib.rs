//! # jsxbridge
//!
//! Development loop for scripting hosts that cannot watch files or report their own
//! runtime errors: compile a typed source tree, bundle it into a single script, optionally
//! minify it, push it into the running host application, and relay runtime errors from
//! inside the host back to the terminal.
//!
//! ## Pipeline
//!
//! ```text
//! compiler ──► bundle pipeline ──► build writer ──► reload dispatcher ──► host
//!                                                                          │
//!                         terminal ◄── log server ◄── error reports ◄──────┘
//! ```
//!
//! ## Quick Start
//!
//! ```no_run
//! use jsxbridge::{BuildConfig, ReloadTarget, WatchSession};
//! use std::sync::Arc;
//!
//! # #[tokio::main]
//! # async fn main() -> jsxbridge::Result<()> {
//! let config = BuildConfig::new("lib/index.js", "dist/index.jsx")
//!     .ts_entry("tsconfig.json")
//!     .reload(ReloadTarget::AutomationBridge {
//!         app: "Adobe InDesign 2024".to_string(),
//!     })
//!     .log_server_port(8123);
//!
//! let session = WatchSession::start(Arc::new(config)).await?;
//! session.run_until(async { let _ = tokio::signal::ctrl_c().await; }).await;
//! # Ok(()) }
//! ```
//!
//! Failures below startup never end a session: compiler diagnostics, bundle errors, minify
//! errors and delivery errors are reported and the loop keeps going.

pub mod bundler;
pub mod compiler;
pub mod config;
pub mod formatter;
pub mod log_server;
pub mod reload;
pub mod session;
pub mod watcher;
pub mod writer;

pub use bundler::{Bundle, BundleOutput, BundlePipeline, BundleStream, Bundler, EsbuildBundler};
pub use compiler::{CompileOutcome, CompilerAdapter, CompilerHandle};
pub use config::{BuildConfig, ReloadTarget, ToolOverrides};
pub use formatter::{ErrorReport, RawException};
pub use log_server::{LogRecord, LogServer, LogServerHandle, LogSink, MemorySink, TerminalSink};
pub use reload::{
    AutomationBridge, Delivery, DeliveryError, DispatchOutcome, ErrorChannel, NetworkPush,
    ReloadDispatcher, ReloadPayload, ReloadTransport, ReloadWorker,
};
pub use session::{
    BuildReport, BuildStatus, SessionOptions, WatchSession, run_build, run_build_with,
};
pub use watcher::DependencyWatcher;
pub use writer::{Artifact, BuildWriter, Minifier, OxcMinifier};

/// Environment variable carrying the log server port into the compiler and the bundle.
pub const LOG_SERVER_PORT_ENV: &str = "LOG_SERVER_PORT";

/// Error types for jsxbridge operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The compiler could not be started or controlled.
    #[error("Compiler error: {0}")]
    Compile(String),

    /// The bundler failed (syntax error, unresolved module, missing tool).
    #[error("Bundle error: {0}")]
    Bundle(String),

    /// Writing the artifact failed.
    #[error("Write failure: {0}")]
    WriteFailure(String),

    /// Minification failed.
    #[error("Minify error: {0}")]
    Minify(String),

    /// The log server could not bind or serve.
    #[error("Log server error: {0}")]
    Server(String),

    /// File watching errors.
    #[error("File watcher error: {0}")]
    Watch(#[from] notify::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for jsxbridge operations.
pub type Result<T> = std::result::Result<T, Error>;

impl miette::Diagnostic for Error {
    fn code(&self) -> Option<Box<dyn std::fmt::Display + '_>> {
        Some(Box::new(match self {
            Error::Compile(_) => "COMPILE_ERROR",
            Error::Bundle(_) => "BUNDLE_ERROR",
            Error::WriteFailure(_) => "WRITE_FAILURE",
            Error::Minify(_) => "MINIFY_ERROR",
            Error::Server(_) => "LOG_SERVER_ERROR",
            Error::Watch(_) => "WATCH_ERROR",
            Error::Io(_) => "IO_ERROR",
            Error::Json(_) => "JSON_ERROR",
        }))
    }

    fn help(&self) -> Option<Box<dyn std::fmt::Display + '_>> {
        let help = match self {
            Error::Bundle(_) => "Fix the reported source error; the previous artifact stays in place",
            Error::Server(_) => "Pick another logServerPort or stop the process holding it",
            _ => return None,
        };
        Some(Box::new(help))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use miette::Diagnostic;

    #[test]
    fn test_error_codes() {
        let err = Error::Bundle("Could not resolve \"./missing\"".to_string());
        assert_eq!(err.code().unwrap().to_string(), "BUNDLE_ERROR");
        assert!(err.help().is_some());

        let err = Error::Minify("Unexpected token".to_string());
        assert_eq!(err.code().unwrap().to_string(), "MINIFY_ERROR");
        assert!(err.help().is_none());
    }

    #[test]
    fn test_error_display() {
        let err = Error::Compile("tsc not found".to_string());
        assert_eq!(err.to_string(), "Compiler error: tsc not found");
    }
}
