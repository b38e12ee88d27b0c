//! Subscriber registry and notification workers.
//!
//! Each subscriber gets its own worker task fed by a `watch` channel that
//! carries the store's notification cycle number. A subscriber is therefore
//! never invoked concurrently with itself, and cycles that land while it is
//! busy collapse into a single follow-up call. Different subscribers run in
//! parallel.
//!
//! When the store loop ends on its own, workers are closed rather than
//! cancelled: each delivers the last cycle it has not seen yet, then stops.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use futures::FutureExt;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::cancel::CancelToken;

use super::store::StoreHandle;

/// A unit of reactive behaviour, invoked after state changes.
///
/// `on_change` may be called many times and must be safe to call
/// redundantly: implementations re-read the state through `store` and no-op
/// when there is nothing to do.
///
/// Long-running work belongs in spawned tasks: when the loop exits, the store
/// waits for each subscriber's last call before it cancels `cancel`.
#[async_trait]
pub trait Subscriber: Send + Sync + 'static {
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    async fn on_change(&self, cancel: &CancelToken, store: &StoreHandle);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriberId(pub usize);

struct Entry {
    id: SubscriberId,
    subscriber: Arc<dyn Subscriber>,
}

struct Running {
    handle: StoreHandle,
    cancel: CancelToken,
}

#[derive(Default)]
struct RegistryInner {
    entries: Vec<Entry>,
    workers: Vec<JoinHandle<()>>,
    running: Option<Running>,
}

pub(crate) struct SubscriberRegistry {
    inner: Mutex<RegistryInner>,
    cycle_tx: watch::Sender<u64>,
    closing_tx: watch::Sender<bool>,
}

impl SubscriberRegistry {
    pub(crate) fn new() -> Self {
        let (cycle_tx, _) = watch::channel(0);
        let (closing_tx, _) = watch::channel(false);
        Self {
            inner: Mutex::new(RegistryInner::default()),
            cycle_tx,
            closing_tx,
        }
    }

    pub(crate) fn register(&self, subscriber: Arc<dyn Subscriber>) -> SubscriberId {
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        let id = SubscriberId(inner.entries.len());
        tracing::debug!(subscriber = subscriber.name(), id = id.0, "subscriber registered");

        // Registered while the loop runs: start right away and let it see the
        // current state once.
        if let Some(running) = &inner.running {
            let worker = spawn_worker(
                subscriber.clone(),
                running.handle.clone(),
                running.cancel.clone(),
                self.cycle_tx.subscribe(),
                self.closing_tx.subscribe(),
                true,
            );
            inner.workers.push(worker);
        }

        inner.entries.push(Entry { id, subscriber });
        id
    }

    pub(crate) fn len(&self) -> usize {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entries
            .len()
    }

    /// Starts one worker per registered subscriber.
    pub(crate) fn start(&self, handle: StoreHandle, cancel: CancelToken) {
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        let workers: Vec<_> = inner
            .entries
            .iter()
            .map(|entry| {
                tracing::trace!(id = entry.id.0, "starting subscriber worker");
                spawn_worker(
                    entry.subscriber.clone(),
                    handle.clone(),
                    cancel.clone(),
                    self.cycle_tx.subscribe(),
                    self.closing_tx.subscribe(),
                    false,
                )
            })
            .collect();
        inner.workers.extend(workers);
        inner.running = Some(Running { handle, cancel });
    }

    /// Signals a new notification cycle to every worker.
    pub(crate) fn notify(&self) -> u64 {
        let mut cycle = 0;
        self.cycle_tx.send_modify(|c| {
            *c += 1;
            cycle = *c;
        });
        cycle
    }

    /// Lets every worker deliver its pending cycle, then waits for all of
    /// them. Workers already stopped by cancellation are just joined.
    pub(crate) async fn close(&self) {
        let workers = {
            let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
            inner.running = None;
            std::mem::take(&mut inner.workers)
        };
        self.closing_tx.send_replace(true);
        for worker in workers {
            if let Err(e) = worker.await {
                tracing::warn!("subscriber worker ended abnormally: {}", e);
            }
        }
    }
}

fn spawn_worker(
    subscriber: Arc<dyn Subscriber>,
    handle: StoreHandle,
    cancel: CancelToken,
    mut cycles: watch::Receiver<u64>,
    mut closing: watch::Receiver<bool>,
    run_immediately: bool,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut pending = run_immediately;
        loop {
            let mut last = false;
            if !pending {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    changed = cycles.changed() => {
                        if changed.is_err() {
                            break;
                        }
                    }
                    _ = closing.wait_for(|closing| *closing) => {
                        // Deliver a cycle that landed after the previous call, if any.
                        if !cycles.has_changed().unwrap_or(false) {
                            break;
                        }
                        last = true;
                    }
                }
            }
            pending = false;

            let cycle = *cycles.borrow_and_update();
            if cancel.is_cancelled() {
                break;
            }
            invoke(subscriber.as_ref(), &cancel, &handle, cycle).await;
            if last {
                break;
            }
        }
        tracing::trace!(subscriber = subscriber.name(), "subscriber worker stopped");
    })
}

/// Runs one `on_change`, containing any panic to this subscriber.
async fn invoke(subscriber: &dyn Subscriber, cancel: &CancelToken, handle: &StoreHandle, cycle: u64) {
    let fut = subscriber.on_change(cancel, handle);
    match AssertUnwindSafe(fut).catch_unwind().await {
        Ok(()) => {
            tracing::trace!(subscriber = subscriber.name(), cycle, "on_change done");
        }
        Err(panic) => {
            tracing::error!(
                subscriber = subscriber.name(),
                cycle,
                "subscriber panicked: {}",
                panic_message(panic.as_ref())
            );
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
