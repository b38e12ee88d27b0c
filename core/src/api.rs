//! Stable re-exports for consumers (`cli` and external crates).
//!
//! Prefer importing from `tilt_core::api` instead of reaching into internal modules.

pub use crate::cancel::CancelToken;
pub use crate::config::{
    apply_env_overrides, get_tilt_data_dir, load_default, load_from, locate_config, AppConfig,
    LoggingConfig, StoreConfig, TerminalConfig, WebConfig,
};
pub use crate::error::{CliError, PromptError, StoreError};
pub use crate::prompt::{OpenInput, OpenUrl, OutputSink, SharedBuffer, TerminalInput, TerminalPrompt};
pub use crate::state::{BuildInfo, EngineState, LogCheckpoint, TerminalMode, WebHost, WebUrl};
pub use crate::store::{
    Action, EngineReducer, ErrorAction, ExitAction, LogAction, Reducer, ReducerChain, Store,
    StoreHandle, Subscriber, SubscriberId, SwitchTerminalModeAction,
};
