//! Interactive startup prompt.
//!
//! The first time the engine is in [`TerminalMode::Prompt`] the prompt prints
//! its banner, opens the terminal input device and starts two tasks:
//!
//! - the input task (blocking thread) reads one key at a time and hands it to
//!   the processing task, then waits for an acknowledgement before reading
//!   the next key;
//! - the processing task reacts to the key and acknowledges with "stop" or
//!   "continue". It owns the device and closes it when it exits, which also
//!   unblocks an input task still stuck in a read.
//!
//! The banner is shown once per prompt instance; leaving the prompt is final.

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use crate::cancel::CancelToken;
use crate::error::PromptError;
use crate::state::{BuildInfo, TerminalMode, WebHost, WebUrl};
use crate::store::{ErrorAction, ExitAction, StoreHandle, Subscriber, SwitchTerminalModeAction};

use super::input::{OpenInput, OpenUrl, TerminalInput};
use super::output::OutputSink;
use super::status::{banner_lines, start_status_line};

pub struct TerminalPrompt {
    open_input: OpenInput,
    open_url: OpenUrl,
    stdout: OutputSink,
    host: WebHost,
    url: WebUrl,
    announced: AtomicBool,
    init_output: Mutex<String>,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl TerminalPrompt {
    pub fn new(
        open_input: OpenInput,
        open_url: OpenUrl,
        stdout: OutputSink,
        host: WebHost,
        url: WebUrl,
    ) -> Self {
        Self {
            open_input,
            open_url,
            stdout,
            host,
            url,
            announced: AtomicBool::new(false),
            init_output: Mutex::new(String::new()),
            tasks: Mutex::new(Vec::new()),
        }
    }

    /// Output produced during startup, repeated under the banner so that
    /// early warnings are not lost behind the prompt. Lines may show twice.
    pub fn set_init_output(&self, output: impl Into<String>) {
        *self
            .init_output
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = output.into();
    }

    pub fn is_announced(&self) -> bool {
        self.announced.load(Ordering::SeqCst)
    }

    /// Waits for the input and processing tasks, if any were started.
    pub async fn wait(&self) {
        let tasks = std::mem::take(&mut *self.tasks.lock().unwrap_or_else(PoisonError::into_inner));
        for task in tasks {
            if let Err(e) = task.await {
                tracing::warn!("prompt task ended abnormally: {}", e);
            }
        }
    }

    fn announce(&self, build: &BuildInfo) {
        let status_line = start_status_line(&self.url, &self.host);
        let build_stamp = build.human_build_stamp();
        let init_output = self
            .init_output
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();

        for line in banner_lines(&status_line, &build_stamp, &init_output, !self.url.is_empty()) {
            self.stdout.line(line);
        }
    }

    fn listen(&self, device: Arc<dyn TerminalInput>, cancel: &CancelToken, store: &StoreHandle) {
        let (key_tx, key_rx) = mpsc::channel::<KeyPress>(1);

        let input = {
            let device = device.clone();
            let cancel = cancel.clone();
            let store = store.clone();
            tokio::task::spawn_blocking(move || read_keys(device.as_ref(), &key_tx, &cancel, &store))
        };

        let handler = KeyHandler {
            open_url: self.open_url.clone(),
            stdout: self.stdout.clone(),
            url: self.url.clone(),
            store: store.clone(),
        };
        let processing = tokio::spawn(process_keys(
            handler,
            DeviceGuard { device },
            key_rx,
            cancel.clone(),
        ));

        self.tasks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend([input, processing]);
        tracing::debug!("terminal prompt listening");
    }
}

#[async_trait]
impl Subscriber for TerminalPrompt {
    fn name(&self) -> &str {
        "terminal-prompt"
    }

    async fn on_change(&self, cancel: &CancelToken, store: &StoreHandle) {
        let (mode, build) = store
            .with_read_lock(|state| (state.terminal_mode, state.build.clone()))
            .await;
        if mode != TerminalMode::Prompt {
            return;
        }
        if self.announced.swap(true, Ordering::SeqCst) {
            return;
        }

        self.announce(&build);

        let device = match (self.open_input)() {
            Ok(device) => device,
            Err(e) => {
                let err = PromptError::OpenInput(e);
                tracing::warn!("{}", err);
                store.dispatch(ErrorAction::new(err));
                return;
            }
        };
        self.listen(device, cancel, store);
    }
}

/// One key handed from the input task to the processing task.
struct KeyPress {
    key: char,
    /// `true` tells the input task to stop reading.
    ack: oneshot::Sender<bool>,
}

/// Closes the device when dropped, on every exit path of the processing task.
struct DeviceGuard {
    device: Arc<dyn TerminalInput>,
}

impl Drop for DeviceGuard {
    fn drop(&mut self) {
        match self.device.close() {
            Ok(()) => tracing::debug!("terminal input closed"),
            Err(e) => tracing::debug!("close terminal input failed: {}", e),
        }
    }
}

fn read_keys(
    device: &dyn TerminalInput,
    key_tx: &mpsc::Sender<KeyPress>,
    cancel: &CancelToken,
    store: &StoreHandle,
) {
    while !cancel.is_cancelled() {
        let key = match device.read_rune() {
            Ok(key) => key,
            // The user asked to quit (ctrl-c in raw mode): not a device failure.
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {
                tracing::info!("terminal prompt interrupted: {}", e);
                store.dispatch(ExitAction::default());
                return;
            }
            Err(e) => {
                let err = PromptError::ReadInput(e);
                tracing::debug!("{}", err);
                store.dispatch(ErrorAction::new(err));
                return;
            }
        };

        let (ack, ack_rx) = oneshot::channel();
        if key_tx.blocking_send(KeyPress { key, ack }).is_err() {
            return;
        }
        match ack_rx.blocking_recv() {
            Ok(false) => {}
            // Stop requested, or the processing task went away without answering.
            Ok(true) | Err(_) => return,
        }
    }
}

async fn process_keys(
    handler: KeyHandler,
    device: DeviceGuard,
    mut key_rx: mpsc::Receiver<KeyPress>,
    cancel: CancelToken,
) {
    let _device = device;
    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::debug!("terminal prompt cancelled");
                return;
            }
            msg = key_rx.recv() => {
                let Some(KeyPress { key, ack }) = msg else {
                    return;
                };
                let stop = handler.handle(key);
                let _ = ack.send(stop);
                if stop {
                    return;
                }
            }
        }
    }
}

struct KeyHandler {
    open_url: OpenUrl,
    stdout: OutputSink,
    url: WebUrl,
    store: StoreHandle,
}

impl KeyHandler {
    /// Reacts to one key. Returns true when the prompt is done.
    fn handle(&self, key: char) -> bool {
        match key {
            's' => {
                self.store.dispatch(SwitchTerminalModeAction {
                    mode: TerminalMode::Stream,
                });
                true
            }
            'h' => {
                self.store.dispatch(SwitchTerminalModeAction {
                    mode: TerminalMode::Hud,
                });
                true
            }
            ' ' if !self.url.is_empty() => {
                self.stdout.line(format!("Opening browser: {}", self.url));
                if let Err(e) = (self.open_url)(self.url.as_str()) {
                    self.stdout.line(format!("Error: {}", e));
                    tracing::warn!("{}", PromptError::OpenBrowser(e));
                }
                false
            }
            other => {
                self.stdout.line(format!("Unrecognized option: {}", other));
                false
            }
        }
    }
}
