use serde::{Deserialize, Serialize};

use crate::state::{TerminalMode, WebHost, WebUrl};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub web: WebConfig,

    #[serde(default)]
    pub terminal: TerminalConfig,

    #[serde(default)]
    pub store: StoreConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_logging_enabled")]
    pub enabled: bool,

    /// If true, log to stderr. Off by default: stderr shares the terminal
    /// with the prompt.
    #[serde(default)]
    pub console: bool,

    /// If true, log to a file under `directory` (or OS temp dir if unset).
    #[serde(default = "default_logging_file")]
    pub file: bool,

    /// EnvFilter string, e.g. "info" or "tilt_core=debug".
    #[serde(default = "default_logging_level")]
    pub level: String,

    /// Optional directory for log files. If empty or unset, uses OS temp dir.
    #[serde(default)]
    pub directory: Option<String>,
}

fn default_logging_enabled() -> bool {
    true
}

fn default_logging_file() -> bool {
    true
}

fn default_logging_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: default_logging_enabled(),
            console: false,
            file: default_logging_file(),
            level: default_logging_level(),
            directory: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebConfig {
    /// Serve the browser UI. When false the prompt reports "without browser UI".
    #[serde(default = "default_web_enabled")]
    pub enabled: bool,

    #[serde(default = "default_web_host")]
    pub host: String,

    #[serde(default = "default_web_port")]
    pub port: u16,
}

fn default_web_enabled() -> bool {
    true
}

fn default_web_host() -> String {
    "localhost".to_string()
}

fn default_web_port() -> u16 {
    10350
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            enabled: default_web_enabled(),
            host: default_web_host(),
            port: default_web_port(),
        }
    }
}

impl WebConfig {
    pub fn url(&self) -> WebUrl {
        if !self.enabled || self.port == 0 {
            return WebUrl::empty();
        }
        WebUrl::new(format!("http://{}:{}", self.host, self.port))
    }

    pub fn host(&self) -> WebHost {
        WebHost::new(self.host.clone())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TerminalConfig {
    #[serde(default)]
    pub mode: TerminalMode,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Upper bound on actions applied per notification cycle.
    #[serde(default = "default_max_batch")]
    pub max_batch: usize,
}

fn default_max_batch() -> usize {
    64
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            max_batch: default_max_batch(),
        }
    }
}
