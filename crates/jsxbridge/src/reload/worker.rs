use super::{DispatchOutcome, ReloadDispatcher, ReloadPayload};
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::Notify;
use tokio::task::JoinHandle;

/// How long a delivery may run before a newer build is allowed to start alongside it.
pub const STALL_AFTER: Duration = Duration::from_secs(10);

/// Serializes deliveries.
///
/// Rebuilds enqueue payloads and move on. Only the newest undelivered payload is kept: a
/// payload still waiting when a newer one arrives is dropped, since every reload evaluates the
/// latest artifact anyway. One task delivers them in order with at most one delivery in
/// flight, unless a delivery has been running for longer than the stall timeout and a newer
/// payload is waiting. The stalled delivery is then left running and the newer one starts.
#[derive(Debug)]
pub struct ReloadWorker {
    slot: Arc<PendingSlot>,
    task: JoinHandle<()>,
}

/// Latest-wins holding area between rebuilds and the delivery task.
#[derive(Debug, Default)]
struct PendingSlot {
    pending: Mutex<Option<ReloadPayload>>,
    closed: AtomicBool,
    notify: Notify,
}

impl PendingSlot {
    /// Store `payload`, returning the one it replaced.
    fn put(&self, payload: ReloadPayload) -> Option<ReloadPayload> {
        let replaced = self.pending.lock().replace(payload);
        self.notify.notify_one();
        replaced
    }

    fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
        self.notify.notify_one();
    }

    /// Next payload to deliver, `None` once closed and drained.
    async fn next(&self) -> Option<ReloadPayload> {
        loop {
            if let Some(payload) = self.pending.lock().take() {
                return Some(payload);
            }
            if self.closed.load(Ordering::SeqCst) {
                return None;
            }
            self.notify.notified().await;
        }
    }

    /// Resolves once `after` has passed and a newer payload is waiting or the slot is closed.
    async fn superseded_after(&self, after: Duration) {
        tokio::time::sleep(after).await;
        loop {
            if self.pending.lock().is_some() || self.closed.load(Ordering::SeqCst) {
                return;
            }
            self.notify.notified().await;
        }
    }
}

/// A spawned delivery, aborted when dropped.
struct InFlight(JoinHandle<()>);

impl Drop for InFlight {
    fn drop(&mut self) {
        self.0.abort();
    }
}

impl ReloadWorker {
    pub fn spawn(dispatcher: Arc<ReloadDispatcher>) -> Self {
        Self::spawn_with_observer(dispatcher, STALL_AFTER, |_| {})
    }

    /// Like [`spawn`](Self::spawn), calling `observer` with every outcome and letting a newer
    /// payload overtake a delivery that has run for `stall_after`.
    pub fn spawn_with_observer<F>(
        dispatcher: Arc<ReloadDispatcher>,
        stall_after: Duration,
        observer: F,
    ) -> Self
    where
        F: Fn(&DispatchOutcome) + Send + Sync + 'static,
    {
        let slot = Arc::new(PendingSlot::default());
        let task = tokio::spawn(run(dispatcher, slot.clone(), stall_after, Arc::new(observer)));
        Self { slot, task }
    }

    /// Queue a delivery, replacing any payload still waiting. Returns `false` once the worker
    /// has stopped.
    pub fn enqueue(&self, payload: ReloadPayload) -> bool {
        if self.slot.closed.load(Ordering::SeqCst) || self.task.is_finished() {
            return false;
        }
        if let Some(replaced) = self.slot.put(payload) {
            tracing::debug!(
                "reload of {} superseded by a newer build",
                replaced.artifact.display()
            );
        }
        true
    }

    /// Stop immediately, abandoning pending and in-flight deliveries.
    pub fn abort(self) {
        self.task.abort();
    }

    /// Stop accepting payloads and wait for the pending delivery to finish.
    pub async fn shutdown(self) {
        self.slot.close();
        if let Err(e) = self.task.await {
            tracing::debug!("reload worker ended abnormally: {}", e);
        }
    }
}

async fn run<F>(
    dispatcher: Arc<ReloadDispatcher>,
    slot: Arc<PendingSlot>,
    stall_after: Duration,
    observer: Arc<F>,
) where
    F: Fn(&DispatchOutcome) + Send + Sync + 'static,
{
    let mut stalled: Vec<InFlight> = Vec::new();

    while let Some(payload) = slot.next().await {
        stalled.retain(|delivery| !delivery.0.is_finished());

        let dispatcher = dispatcher.clone();
        let observer = observer.clone();
        let mut current = InFlight(tokio::spawn(async move {
            let outcome = dispatcher.dispatch(&payload).await;
            (*observer)(&outcome);
        }));

        let finished = tokio::select! {
            joined = &mut current.0 => {
                if let Err(e) = joined {
                    tracing::debug!("reload delivery ended abnormally: {}", e);
                }
                true
            }
            () = slot.superseded_after(stall_after) => false,
        };

        if !finished {
            tracing::warn!(
                "Reload still in flight after {}s, delivering the newer build",
                stall_after.as_secs_f32()
            );
            stalled.push(current);
        }
    }
}
