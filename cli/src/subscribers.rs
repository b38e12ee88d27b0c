//! Console views for the non-interactive modes.

use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use tilt_core::api::{
    CancelToken, LogCheckpoint, OutputSink, StoreHandle, Subscriber, TerminalMode,
};

/// Prints log lines while the engine is in stream mode. Lines appended
/// before the mode was entered are printed too, once.
pub struct LogStreamer {
    out: OutputSink,
    checkpoint: Mutex<LogCheckpoint>,
}

impl LogStreamer {
    pub fn new(out: OutputSink) -> Self {
        Self {
            out,
            checkpoint: Mutex::new(0),
        }
    }
}

#[async_trait]
impl Subscriber for LogStreamer {
    fn name(&self) -> &str {
        "log-streamer"
    }

    async fn on_change(&self, _cancel: &CancelToken, store: &StoreHandle) {
        let since = *self
            .checkpoint
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let lines = store
            .with_read_lock(|state| {
                (state.terminal_mode == TerminalMode::Stream).then(|| state.logs.since(since))
            })
            .await;

        let Some((lines, next)) = lines else {
            return;
        };
        for line in lines {
            self.out.line(line);
        }
        *self
            .checkpoint
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = next;
    }
}

/// Prints one line each time the engine settles into a new non-prompt mode.
pub struct ModeAnnouncer {
    out: OutputSink,
    last: Mutex<Option<TerminalMode>>,
}

impl ModeAnnouncer {
    pub fn new(out: OutputSink) -> Self {
        Self {
            out,
            last: Mutex::new(None),
        }
    }
}

#[async_trait]
impl Subscriber for ModeAnnouncer {
    fn name(&self) -> &str {
        "mode-announcer"
    }

    async fn on_change(&self, _cancel: &CancelToken, store: &StoreHandle) {
        let mode = store.with_read_lock(|state| state.terminal_mode).await;
        let mut last = self.last.lock().unwrap_or_else(PoisonError::into_inner);
        if *last == Some(mode) {
            return;
        }
        *last = Some(mode);

        match mode {
            TerminalMode::Prompt => {}
            TerminalMode::Stream => self.out.line("Streaming logs. (ctrl-c) to exit"),
            TerminalMode::Hud => self
                .out
                .line("Terminal HUD is not part of this build. (ctrl-c) to exit"),
        }
    }
}
