//! Real terminal access for the prompt.

use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal;
use tilt_core::api::{OpenInput, TerminalInput};

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Keyboard input in raw mode.
///
/// Reads poll so that `close` from another thread is noticed within one poll
/// interval. Raw mode swallows SIGINT, so ctrl-c is reported as an
/// `Interrupted` error.
pub struct CrosstermInput {
    closed: AtomicBool,
}

impl CrosstermInput {
    pub fn open() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        tracing::debug!("terminal raw mode enabled");
        Ok(Self {
            closed: AtomicBool::new(false),
        })
    }
}

impl TerminalInput for CrosstermInput {
    fn read_rune(&self) -> io::Result<char> {
        loop {
            if self.closed.load(Ordering::SeqCst) {
                return Err(io::Error::new(
                    io::ErrorKind::BrokenPipe,
                    "terminal input closed",
                ));
            }
            if !event::poll(POLL_INTERVAL)? {
                continue;
            }
            let Event::Key(key) = event::read()? else {
                continue;
            };
            if let Some(result) = key_to_rune(key) {
                return result;
            }
        }
    }

    fn close(&self) -> io::Result<()> {
        if self.closed.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        terminal::disable_raw_mode()
    }
}

impl Drop for CrosstermInput {
    fn drop(&mut self) {
        let _ = self.close();
    }
}

/// `None` for events the prompt ignores (releases, repeats, non-character keys).
fn key_to_rune(key: KeyEvent) -> Option<io::Result<char>> {
    if key.kind != KeyEventKind::Press {
        tracing::trace!("key event ignored: {:?}", key);
        return None;
    }
    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => Some(Err(
            io::Error::new(io::ErrorKind::Interrupted, "interrupted (ctrl-c)"),
        )),
        KeyCode::Char(c) => Some(Ok(c)),
        KeyCode::Enter => Some(Ok('\n')),
        KeyCode::Tab => Some(Ok('\t')),
        _ => None,
    }
}

pub fn terminal_opener() -> OpenInput {
    Arc::new(|| Ok(Arc::new(CrosstermInput::open()?) as Arc<dyn TerminalInput>))
}

/// Translates `\n` into `\r\n` so output stays aligned while the terminal is
/// in raw mode.
pub struct CrlfWriter<W> {
    inner: W,
}

impl<W: Write> CrlfWriter<W> {
    pub fn new(inner: W) -> Self {
        Self { inner }
    }
}

impl<W: Write> Write for CrlfWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        for chunk in buf.split_inclusive(|b| *b == b'\n') {
            match chunk.split_last() {
                Some((b'\n', body)) => {
                    self.inner.write_all(body)?;
                    self.inner.write_all(b"\r\n")?;
                }
                _ => self.inner.write_all(chunk)?,
            }
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn press(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    #[test]
    fn test_key_mapping() {
        let rune = |code| key_to_rune(press(code, KeyModifiers::NONE)).map(|r| r.unwrap());
        assert_eq!(rune(KeyCode::Char('s')), Some('s'));
        assert_eq!(rune(KeyCode::Char(' ')), Some(' '));
        assert_eq!(rune(KeyCode::Enter), Some('\n'));
        assert_eq!(rune(KeyCode::Up), None);
    }

    #[test]
    fn test_ctrl_c_is_interrupt() {
        let err = key_to_rune(press(KeyCode::Char('c'), KeyModifiers::CONTROL))
            .unwrap()
            .unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::Interrupted);
    }

    #[test]
    fn test_release_is_ignored() {
        let mut key = press(KeyCode::Char('h'), KeyModifiers::NONE);
        key.kind = KeyEventKind::Release;
        assert!(key_to_rune(key).is_none());
    }

    #[test]
    fn test_crlf_writer() {
        let mut w = CrlfWriter::new(Vec::new());
        write!(w, "one\ntwo\n\nthree").unwrap();
        assert_eq!(w.inner, b"one\r\ntwo\r\n\r\nthree".to_vec());
    }
}
