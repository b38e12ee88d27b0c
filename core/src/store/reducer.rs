//! Pure state transitions: `(old state, action) -> new state`.
//!
//! Reducers run inside the store's write lock, so they must not block,
//! perform I/O or dispatch further actions.

use crate::state::EngineState;

use super::actions::{Action, ErrorAction, ExitAction, LogAction, SwitchTerminalModeAction};

pub trait Reducer: Send + Sync + 'static {
    fn reduce(&self, state: &mut EngineState, action: &dyn Action);
}

impl<F> Reducer for F
where
    F: Fn(&mut EngineState, &dyn Action) + Send + Sync + 'static,
{
    fn reduce(&self, state: &mut EngineState, action: &dyn Action) {
        self(state, action)
    }
}

/// Reduces the actions defined by this crate. Anything else is left alone.
#[derive(Debug, Clone, Copy, Default)]
pub struct EngineReducer;

impl Reducer for EngineReducer {
    fn reduce(&self, state: &mut EngineState, action: &dyn Action) {
        if let Some(switch) = action.downcast_ref::<SwitchTerminalModeAction>() {
            state.terminal_mode = switch.mode;
        } else if let Some(err) = action.downcast_ref::<ErrorAction>() {
            state.record_fatal(format!("{:#}", err.error));
        } else if let Some(exit) = action.downcast_ref::<ExitAction>() {
            match &exit.error {
                Some(error) => state.record_fatal(error.clone()),
                None => state.exit_signal = true,
            }
        } else if let Some(log) = action.downcast_ref::<LogAction>() {
            state.logs.push(log.line.clone());
        }
    }
}

/// Runs every reducer, in order, for each action.
#[derive(Default)]
pub struct ReducerChain {
    reducers: Vec<Box<dyn Reducer>>,
}

impl ReducerChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, reducer: impl Reducer) -> Self {
        self.reducers.push(Box::new(reducer));
        self
    }

    pub fn len(&self) -> usize {
        self.reducers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reducers.is_empty()
    }
}

impl Reducer for ReducerChain {
    fn reduce(&self, state: &mut EngineState, action: &dyn Action) {
        for reducer in &self.reducers {
            reducer.reduce(state, action);
        }
    }
}

/// Folds `actions` over `initial`. The store's state after applying the same
/// actions is always equal to this.
pub fn fold<'a, R, I>(reducer: &R, initial: EngineState, actions: I) -> EngineState
where
    R: Reducer + ?Sized,
    I: IntoIterator<Item = &'a dyn Action>,
{
    let mut state = initial;
    for action in actions {
        reducer.reduce(&mut state, action);
    }
    state
}
