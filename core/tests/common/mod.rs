#![allow(dead_code)]

use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{mpsc, Arc, Mutex};

use tilt_core::api::{BuildInfo, EngineState, OpenInput, TerminalInput, TerminalMode};

/// What a raw terminal delivers for ctrl-c.
pub const CTRL_C: char = '\u{3}';

/// Terminal double. Keys can be queued up front or pushed while the prompt
/// is running; `close` drops the feeder so a pending read fails.
pub struct FakeTerminal {
    keys: Mutex<mpsc::Receiver<char>>,
    feeder: Mutex<Option<mpsc::Sender<char>>>,
    reads: AtomicUsize,
    closes: AtomicUsize,
}

impl FakeTerminal {
    pub fn new(script: &str) -> Arc<Self> {
        let (tx, rx) = mpsc::channel();
        for key in script.chars() {
            tx.send(key).unwrap();
        }
        Arc::new(Self {
            keys: Mutex::new(rx),
            feeder: Mutex::new(Some(tx)),
            reads: AtomicUsize::new(0),
            closes: AtomicUsize::new(0),
        })
    }

    pub fn press(&self, key: char) {
        if let Some(tx) = self.feeder.lock().unwrap().as_ref() {
            let _ = tx.send(key);
        }
    }

    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    pub fn closes(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }

    pub fn opener(self: &Arc<Self>) -> OpenInput {
        let device = self.clone();
        Arc::new(move || Ok(device.clone() as Arc<dyn TerminalInput>))
    }
}

impl TerminalInput for FakeTerminal {
    fn read_rune(&self) -> io::Result<char> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        match self.keys.lock().unwrap().recv() {
            Ok(CTRL_C) => Err(io::Error::new(io::ErrorKind::Interrupted, "ctrl-c")),
            Ok(key) => Ok(key),
            Err(_) => Err(io::Error::new(io::ErrorKind::BrokenPipe, "terminal closed")),
        }
    }

    fn close(&self) -> io::Result<()> {
        self.closes.fetch_add(1, Ordering::SeqCst);
        self.feeder.lock().unwrap().take();
        Ok(())
    }
}

pub fn release_build() -> BuildInfo {
    BuildInfo {
        version: "0.4.0".into(),
        date: "2026-10-01".into(),
        dev: false,
    }
}

pub fn prompt_state() -> EngineState {
    EngineState::new(TerminalMode::Prompt, release_build())
}
