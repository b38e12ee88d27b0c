pub mod api;
pub mod cancel;
pub mod config;
pub mod error;
pub mod prompt;
pub mod state;
pub mod store;
