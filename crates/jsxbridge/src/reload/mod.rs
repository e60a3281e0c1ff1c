//! Live reload.
//!
//! After every successful write the artifact is handed to exactly one [`ReloadTransport`]:
//! the OS automation bridge ([`AutomationBridge`]) or an HTTP push into a companion
//! extension ([`NetworkPush`]). Both deliver the same [bootstrap](bootstrap) script, which
//! evaluates the artifact inside the host and reports what happened.
//!
//! Delivery failures are logged and never end a session.

pub mod bootstrap;
mod bridge;
mod push;
mod worker;

pub use bootstrap::ErrorChannel;
pub use bridge::{AutomationBridge, applescript_escape, applescript_for};
pub use push::NetworkPush;
pub use worker::{ReloadWorker, STALL_AFTER};

use crate::log_server::LogSink;
use crate::ReloadTarget;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

/// What gets sent into the host for one artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReloadPayload {
    pub artifact: PathBuf,
    /// Host-side script that evaluates `artifact`.
    pub bootstrap: String,
}

impl ReloadPayload {
    pub fn new(artifact: impl Into<PathBuf>, channel: ErrorChannel) -> Self {
        let artifact = artifact.into();
        let bootstrap = bootstrap::render(&artifact, channel);
        Self {
            artifact,
            bootstrap,
        }
    }
}

/// A successful delivery.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Delivery {
    /// Text the host returned, if the transport can observe it.
    pub output: Option<String>,
}

/// Why a delivery failed.
#[derive(Debug, Error)]
pub enum DeliveryError {
    /// Nothing is listening at the companion address.
    #[error(
        "Unable to connect to the companion extension at http://{host}:{port}, is the companion extension installed and open?"
    )]
    Unreachable {
        host: String,
        port: u16,
        reason: String,
    },

    /// The companion answered with a non-success status.
    #[error("Companion extension at http://{host}:{port} rejected the script (HTTP {status})")]
    Rejected { host: String, port: u16, status: u16 },

    /// The automation shell failed.
    #[error("Automation bridge failed: {0}")]
    Bridge(String),

    /// The transport does not exist on this platform.
    #[error("{0}")]
    Unsupported(String),

    #[error("I/O error during delivery: {0}")]
    Io(#[from] std::io::Error),
}

/// A way of getting a script into the running host.
#[async_trait]
pub trait ReloadTransport: Send + Sync + std::fmt::Debug {
    /// Deliver `payload` and wait for the host to acknowledge it.
    async fn deliver(&self, payload: &ReloadPayload) -> Result<Delivery, DeliveryError>;

    /// Short description for progress output.
    fn describe(&self) -> String;
}

/// Result of one dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    Delivered(Delivery),
    Failed { message: String },
}

impl DispatchOutcome {
    pub fn is_delivered(&self) -> bool {
        matches!(self, DispatchOutcome::Delivered(_))
    }
}

/// Builds payloads for, and delivers them through, one transport.
#[derive(Debug, Clone)]
pub struct ReloadDispatcher {
    transport: Arc<dyn ReloadTransport>,
    channel: ErrorChannel,
}

impl ReloadDispatcher {
    pub fn new(transport: Arc<dyn ReloadTransport>, channel: ErrorChannel) -> Self {
        Self { transport, channel }
    }

    /// Dispatcher for a configured target.
    pub fn for_target(
        target: &ReloadTarget,
        log_server_port: Option<u16>,
        sink: Arc<dyn LogSink>,
    ) -> Self {
        let channel = ErrorChannel::for_target(Some(target), log_server_port);
        let transport: Arc<dyn ReloadTransport> = match target {
            ReloadTarget::AutomationBridge { app } => {
                Arc::new(AutomationBridge::new(app.clone(), sink))
            }
            ReloadTarget::NetworkPush { host, port } => {
                Arc::new(NetworkPush::new(host.clone(), *port))
            }
        };
        Self::new(transport, channel)
    }

    /// Payload for the artifact at `artifact`.
    pub fn payload(&self, artifact: &Path) -> ReloadPayload {
        ReloadPayload::new(artifact, self.channel)
    }

    pub fn describe(&self) -> String {
        self.transport.describe()
    }

    /// Deliver `payload`. Failures become a single warning.
    pub async fn dispatch(&self, payload: &ReloadPayload) -> DispatchOutcome {
        tracing::debug!(
            "-> deliver {} via {}",
            payload.artifact.display(),
            self.transport.describe()
        );

        match self.transport.deliver(payload).await {
            Ok(delivery) => {
                tracing::info!("Reloaded via {}", self.transport.describe());
                DispatchOutcome::Delivered(delivery)
            }
            Err(e) => {
                let message = e.to_string();
                tracing::warn!("{}", message);
                DispatchOutcome::Failed { message }
            }
        }
    }
}
