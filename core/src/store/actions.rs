use std::any::Any;
use std::fmt;

use crate::state::TerminalMode;

/// Object-safe access to `Any` for every `'static` type.
pub trait AsAny {
    fn as_any(&self) -> &dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// One discrete intent to mutate engine state.
///
/// Actions are plain data. Any crate can define new action types; reducers
/// recognise the ones they care about through [`downcast_ref`](trait.Action.html#method.downcast_ref).
pub trait Action: AsAny + Send + Sync + fmt::Debug + 'static {
    fn name(&self) -> &'static str;
}

impl dyn Action {
    pub fn downcast_ref<T: Action>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }

    pub fn is<T: Action>(&self) -> bool {
        self.as_any().is::<T>()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwitchTerminalModeAction {
    pub mode: TerminalMode,
}

impl Action for SwitchTerminalModeAction {
    fn name(&self) -> &'static str {
        "switch_terminal_mode"
    }
}

/// Failure report. Recorded as the engine's fatal error.
#[derive(Debug)]
pub struct ErrorAction {
    pub error: anyhow::Error,
}

impl ErrorAction {
    pub fn new(error: impl Into<anyhow::Error>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

impl Action for ErrorAction {
    fn name(&self) -> &'static str {
        "error"
    }
}

/// Orderly exit request, optionally carrying the reason as an error.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExitAction {
    pub error: Option<String>,
}

impl Action for ExitAction {
    fn name(&self) -> &'static str {
        "exit"
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogAction {
    pub line: String,
}

impl LogAction {
    pub fn new(line: impl Into<String>) -> Self {
        Self { line: line.into() }
    }
}

impl Action for LogAction {
    fn name(&self) -> &'static str {
        "log"
    }
}
