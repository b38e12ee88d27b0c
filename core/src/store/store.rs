//! 引擎状态存储：唯一写入者，串行 apply，apply 后通知订阅者。

use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::{mpsc, RwLock, RwLockReadGuard};

use crate::cancel::CancelToken;
use crate::config::StoreConfig;
use crate::error::StoreError;
use crate::state::EngineState;

use super::actions::Action;
use super::reducer::Reducer;
use super::subscriber::{Subscriber, SubscriberId, SubscriberRegistry};

/// Read guard over the engine state. The lock is released when it drops.
pub type StateReadGuard<'a> = RwLockReadGuard<'a, EngineState>;

type ActionBox = Box<dyn Action>;

/// Owner of the engine state.
///
/// Cloning is cheap; all clones share the same state, queue and subscribers.
#[derive(Clone)]
pub struct Store {
    inner: Arc<StoreInner>,
}

struct StoreInner {
    state: RwLock<EngineState>,
    reducer: Box<dyn Reducer>,
    action_tx: mpsc::UnboundedSender<ActionBox>,
    /// Taken by `run`; `None` while the loop is running or after it ended.
    action_rx: Mutex<Option<mpsc::UnboundedReceiver<ActionBox>>>,
    subscribers: SubscriberRegistry,
    config: StoreConfig,
}

impl Store {
    pub fn new(initial: EngineState, reducer: impl Reducer) -> Self {
        Self::with_config(initial, reducer, StoreConfig::default())
    }

    pub fn with_config(initial: EngineState, reducer: impl Reducer, config: StoreConfig) -> Self {
        let (action_tx, action_rx) = mpsc::unbounded_channel();
        let inner = StoreInner {
            state: RwLock::new(initial),
            reducer: Box::new(reducer),
            action_tx,
            action_rx: Mutex::new(Some(action_rx)),
            subscribers: SubscriberRegistry::new(),
            config,
        };
        Self {
            inner: Arc::new(inner),
        }
    }

    /// Handle given to subscribers: read access and dispatch, nothing else.
    pub fn handle(&self) -> StoreHandle {
        StoreHandle {
            inner: self.inner.clone(),
        }
    }

    /// Adds a subscriber. Allowed before and during [`run`](Self::run); when
    /// the loop is already running this must be called inside the runtime.
    pub fn add_subscriber(&self, subscriber: Arc<dyn Subscriber>) -> SubscriberId {
        self.inner.subscribers.register(subscriber)
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.subscribers.len()
    }

    pub fn dispatch(&self, action: impl Action) {
        self.inner.dispatch(Box::new(action));
    }

    pub async fn read_state(&self) -> StateReadGuard<'_> {
        self.inner.state.read().await
    }

    pub async fn with_read_lock<R>(&self, f: impl FnOnce(&EngineState) -> R) -> R {
        let state = self.inner.state.read().await;
        f(&state)
    }

    /// The apply loop.
    ///
    /// Applies queued actions in dispatch order, in batches of at most
    /// `max_batch`, and notifies every subscriber after each batch once the
    /// write lock is released. Returns when the state carries an exit signal
    /// or `cancel` fires. Subscriber workers are drained and joined, and
    /// `cancel` is fired, before returning.
    pub async fn run(&self, cancel: CancelToken) -> Result<(), StoreError> {
        let mut action_rx = self
            .inner
            .action_rx
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
            .ok_or(StoreError::AlreadyRunning)?;

        let max_batch = self.inner.config.max_batch.max(1);
        tracing::debug!(
            subscribers = self.inner.subscribers.len(),
            max_batch,
            "store loop started"
        );

        self.inner.subscribers.start(self.handle(), cancel.clone());
        self.inner.subscribers.notify();

        let result = loop {
            let first = tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::debug!("store loop cancelled");
                    break Ok(());
                }
                next = action_rx.recv() => match next {
                    Some(action) => action,
                    // Unreachable while `inner` holds a sender.
                    None => break Ok(()),
                },
            };

            let mut batch = Vec::with_capacity(max_batch.min(16));
            batch.push(first);
            while batch.len() < max_batch {
                match action_rx.try_recv() {
                    Ok(action) => batch.push(action),
                    Err(_) => break,
                }
            }

            let outcome = self.apply_batch(batch).await;
            let cycle = self.inner.subscribers.notify();
            tracing::trace!(cycle, "subscribers notified");

            if let Some(outcome) = outcome {
                break outcome;
            }
        };

        drop(action_rx);
        // Subscribers see the final state before their tasks are cancelled.
        self.inner.subscribers.close().await;
        cancel.cancel();
        tracing::debug!(ok = result.is_ok(), "store loop stopped");
        result
    }

    /// Applies a batch under the write lock. Returns the loop outcome when the
    /// resulting state asks the engine to exit.
    async fn apply_batch(&self, batch: Vec<ActionBox>) -> Option<Result<(), StoreError>> {
        let size = batch.len();
        self.with_write_lock(|state| {
            for action in &batch {
                tracing::trace!(action = action.name(), "apply");
                self.inner.reducer.reduce(state, action.as_ref());
            }
            tracing::trace!(batch = size, "batch applied");

            if !state.exit_signal {
                return None;
            }
            Some(match &state.fatal_error {
                Some(error) => Err(StoreError::Fatal(error.clone())),
                None => Ok(()),
            })
        })
        .await
    }

    async fn with_write_lock<R>(&self, f: impl FnOnce(&mut EngineState) -> R) -> R {
        let mut state = self.inner.state.write().await;
        f(&mut state)
    }

    /// Removes and returns actions that were dispatched but not yet applied.
    #[cfg(test)]
    pub(crate) fn drain_pending(&self) -> Vec<ActionBox> {
        let mut guard = self
            .inner
            .action_rx
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let mut drained = Vec::new();
        if let Some(rx) = guard.as_mut() {
            while let Ok(action) = rx.try_recv() {
                drained.push(action);
            }
        }
        drained
    }
}

impl StoreInner {
    fn dispatch(&self, action: ActionBox) {
        let name = action.name();
        if self.action_tx.send(action).is_err() {
            tracing::debug!(action = name, "store loop stopped, dropping action");
        }
    }
}

/// Read and dispatch access to a [`Store`].
#[derive(Clone)]
pub struct StoreHandle {
    inner: Arc<StoreInner>,
}

impl StoreHandle {
    pub fn dispatch(&self, action: impl Action) {
        self.inner.dispatch(Box::new(action));
    }

    pub async fn read_state(&self) -> StateReadGuard<'_> {
        self.inner.state.read().await
    }

    pub async fn with_read_lock<R>(&self, f: impl FnOnce(&EngineState) -> R) -> R {
        let state = self.inner.state.read().await;
        f(&state)
    }
}
