use std::io;
use std::sync::Arc;

/// The terminal input device the prompt reads keys from.
///
/// `read_rune` blocks. `close` may be called from another thread while a read
/// is in progress and must make that read return an error.
pub trait TerminalInput: Send + Sync {
    fn read_rune(&self) -> io::Result<char>;
    fn close(&self) -> io::Result<()>;
}

/// Opens the terminal input device.
pub type OpenInput = Arc<dyn Fn() -> io::Result<Arc<dyn TerminalInput>> + Send + Sync>;

/// Opens a URL in the user's browser.
pub type OpenUrl = Arc<dyn Fn(&str) -> io::Result<()> + Send + Sync>;
