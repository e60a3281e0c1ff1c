//! Log ingestion server.
//!
//! Code running inside the host has no console the developer can see. It POSTs JSON here
//! instead (the bootstrap does so for runtime errors) and the records are printed in the
//! terminal. Every request gets `200 {"success": true}`, whatever its method, path or body.

mod record;
mod sink;

pub use record::{LogRecord, classify, parse_record};
pub use sink::{LogSink, MemorySink, TerminalSink};

use crate::{Error, Result};
use axum::{
    Json, Router,
    body::Bytes,
    extract::{DefaultBodyLimit, State, rejection::BytesRejection},
};
use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tower_http::cors::{Any, CorsLayer};

/// Largest request body accepted. Bigger bodies are answered but not recorded.
pub const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Loopback HTTP listener for host-side logs.
pub struct LogServer;

impl LogServer {
    /// Bind `127.0.0.1:port` and start serving. Port 0 picks a free port.
    pub async fn start(port: u16, sink: Arc<dyn LogSink>) -> Result<LogServerHandle> {
        let addr = SocketAddr::from((Ipv4Addr::LOCALHOST, port));
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| Error::Server(format!("Failed to bind to {}: {}", addr, e)))?;
        let local_addr = listener.local_addr()?;

        let app = router(sink);

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let task = tokio::spawn(async move {
            let result = axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    let _ = shutdown_rx.await;
                })
                .await;
            if let Err(e) = result {
                tracing::error!("Log server error: {}", e);
            }
        });

        tracing::debug!("-> log server on {}", local_addr);
        Ok(LogServerHandle {
            local_addr,
            shutdown: Some(shutdown_tx),
            task: Some(task),
        })
    }
}

fn router(sink: Arc<dyn LogSink>) -> Router {
    Router::new()
        .fallback(handle_log)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(
            // companion panels post from their own origin
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(sink)
}

async fn handle_log(
    State(sink): State<Arc<dyn LogSink>>,
    body: std::result::Result<Bytes, BytesRejection>,
) -> Json<serde_json::Value> {
    let body = match body {
        Ok(body) => body,
        Err(rejection) => {
            tracing::debug!("dropping unreadable log payload: {}", rejection);
            return Json(serde_json::json!({ "success": true }));
        }
    };
    match parse_record(&body) {
        Some(record) => sink.record(record),
        None => tracing::debug!("dropping malformed log payload ({} bytes)", body.len()),
    }
    Json(serde_json::json!({ "success": true }))
}

/// A running log server. Dropping it stops the server without waiting.
#[derive(Debug)]
pub struct LogServerHandle {
    local_addr: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl LogServerHandle {
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn port(&self) -> u16 {
        self.local_addr.port()
    }

    /// Stop accepting connections and wait for the server to close its socket.
    pub async fn stop(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                tracing::debug!("log server task ended abnormally: {}", e);
            }
        }
    }
}

impl Drop for LogServerHandle {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    async fn post(sink: Arc<MemorySink>, body: Vec<u8>) -> (StatusCode, serde_json::Value) {
        let request = Request::post("/")
            .header("content-type", "application/json")
            .body(Body::from(body))
            .unwrap();
        let response = router(sink).oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_oversized_body_is_dropped_with_success() {
        let sink = Arc::new(MemorySink::default());
        let mut body = b"\"".to_vec();
        body.resize(MAX_BODY_BYTES + 16, b'x');
        body.push(b'"');

        let (status, json) = post(sink.clone(), body).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json, serde_json::json!({ "success": true }));
        assert!(sink.is_empty());
    }

    #[tokio::test]
    async fn test_body_under_limit_is_recorded() {
        let sink = Arc::new(MemorySink::default());
        let mut body = b"\"".to_vec();
        body.resize(MAX_BODY_BYTES - 16, b'x');
        body.push(b'"');

        let (status, _) = post(sink.clone(), body).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(sink.len(), 1);
    }
}
