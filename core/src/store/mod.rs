//! # Store
//!
//! The single owner of [`EngineState`](crate::state::EngineState):
//!
//! - producers call `dispatch(action)` from anywhere, including from inside a
//!   subscriber;
//! - one apply loop reduces queued actions under the write lock;
//! - after the lock is released every subscriber is notified and reads the
//!   state it needs through a scoped read lock.

pub mod actions;
pub mod reducer;
#[allow(clippy::module_inception)]
pub mod store;
pub mod subscriber;

pub use actions::{
    Action, ErrorAction, ExitAction, LogAction, SwitchTerminalModeAction,
};
pub use reducer::{fold, EngineReducer, Reducer, ReducerChain};
pub use store::{StateReadGuard, Store, StoreHandle};
pub use subscriber::{Subscriber, SubscriberId};
