use std::io::{self, Write};
use std::sync::{Arc, Mutex, PoisonError};

/// Shared, line-oriented output. Writes are best-effort: failures are logged
/// and otherwise ignored.
#[derive(Clone)]
pub struct OutputSink {
    inner: Arc<Mutex<Box<dyn Write + Send>>>,
}

impl OutputSink {
    pub fn new(writer: impl Write + Send + 'static) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Box::new(writer))),
        }
    }

    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }

    pub fn line(&self, text: impl AsRef<str>) {
        let mut w = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        if let Err(e) = writeln!(w, "{}", text.as_ref()).and_then(|_| w.flush()) {
            tracing::debug!("output write failed: {}", e);
        }
    }
}

/// In-memory writer whose contents can be read back, e.g. to capture startup
/// output for the prompt banner.
#[derive(Clone, Default)]
pub struct SharedBuffer {
    inner: Arc<Mutex<Vec<u8>>>,
}

impl SharedBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> String {
        let buf = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        String::from_utf8_lossy(&buf).into_owned()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Broken;

    impl Write for Broken {
        fn write(&mut self, _: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "stdout closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "stdout closed"))
        }
    }

    #[test]
    fn test_lines_are_captured() {
        let buf = SharedBuffer::new();
        let sink = OutputSink::new(buf.clone());
        sink.line("one");
        sink.clone().line(String::from("two"));
        assert_eq!(buf.contents(), "one\ntwo\n");
    }

    #[test]
    fn test_write_failures_are_swallowed() {
        let sink = OutputSink::new(Broken);
        sink.line("nobody hears this");
    }
}
