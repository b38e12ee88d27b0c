mod load;
mod types;

pub use load::{apply_env_overrides, get_tilt_data_dir, load_default, load_from, locate_config};
pub use types::{AppConfig, LoggingConfig, StoreConfig, TerminalConfig, WebConfig};
