//! Terminal prompt shown at startup.
//!
//! The prompt is a [`Subscriber`](crate::store::Subscriber): every capability
//! it needs from the outside world (terminal device, browser, stdout) is
//! injected, so tests drive it with in-memory doubles.

mod input;
mod output;
mod status;
mod terminal_prompt;

pub use input::{OpenInput, OpenUrl, TerminalInput};
pub use output::{OutputSink, SharedBuffer};
pub use status::{
    banner_lines, start_status_line, MENU_BROWSER, MENU_EXIT, MENU_HUD, MENU_STREAM,
};
pub use terminal_prompt::TerminalPrompt;
