use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("engine stopped: {0}")]
    Store(#[from] StoreError),
    #[error("config error: {0}")]
    Config(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("store loop is already running")]
    AlreadyRunning,
    #[error("fatal error: {0}")]
    Fatal(String),
}

/// Failures raised by the terminal prompt's capabilities.
#[derive(Error, Debug)]
pub enum PromptError {
    #[error("open terminal input failed: {0}")]
    OpenInput(#[source] std::io::Error),
    #[error("read terminal input failed: {0}")]
    ReadInput(#[source] std::io::Error),
    #[error("open browser failed: {0}")]
    OpenBrowser(#[source] std::io::Error),
}
