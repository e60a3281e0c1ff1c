//! Shared test doubles for jsxbridge integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use jsxbridge::{BundleOutput, Bundler, Delivery, DeliveryError, ReloadPayload, ReloadTransport};
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::Notify;

/// Bundles by reading the entry file verbatim. Fails on files containing `SYNTAX ERROR`.
#[derive(Debug, Default)]
pub struct CopyBundler;

#[async_trait]
impl Bundler for CopyBundler {
    async fn bundle(&self, entry: &Path, _cwd: &Path) -> jsxbridge::Result<BundleOutput> {
        let code = tokio::fs::read_to_string(entry).await?;
        if code.contains("SYNTAX ERROR") {
            return Err(jsxbridge::Error::Bundle(format!(
                "{}: Unexpected token",
                entry.display()
            )));
        }
        Ok(BundleOutput {
            code,
            inputs: vec![entry.to_path_buf()],
        })
    }
}

/// Records deliveries and how many overlapped.
#[derive(Debug, Default)]
pub struct RecordingTransport {
    pub delivered: Mutex<Vec<PathBuf>>,
    in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
    /// Per-delivery delay, indexed by arrival order; missing entries mean no delay.
    pub delays: Vec<Duration>,
    /// When set, the first delivery blocks until [`release`](Self::release) is called.
    pub hold_first: bool,
    released: Notify,
    calls: AtomicUsize,
}

impl RecordingTransport {
    pub fn with_delays(delays: Vec<Duration>) -> Self {
        Self {
            delays,
            ..Default::default()
        }
    }

    pub fn holding_first() -> Self {
        Self {
            hold_first: true,
            ..Default::default()
        }
    }

    pub fn release(&self) {
        self.released.notify_one();
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn delivered(&self) -> Vec<PathBuf> {
        self.delivered.lock().clone()
    }

    /// Poll until at least `n` deliveries have been recorded.
    pub async fn wait_for(&self, n: usize) -> Vec<PathBuf> {
        for _ in 0..500 {
            let delivered = self.delivered();
            if delivered.len() >= n {
                return delivered;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("expected {} deliveries, got {:?}", n, self.delivered());
    }
}

#[async_trait]
impl ReloadTransport for RecordingTransport {
    async fn deliver(&self, payload: &ReloadPayload) -> Result<Delivery, DeliveryError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        if call == 0 && self.hold_first {
            self.released.notified().await;
        }
        if let Some(delay) = self.delays.get(call) {
            tokio::time::sleep(*delay).await;
        }

        self.delivered.lock().push(payload.artifact.clone());
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        Ok(Delivery::default())
    }

    fn describe(&self) -> String {
        "recording".to_string()
    }
}
