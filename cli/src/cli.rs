use clap::Parser;
use tilt_core::api::{AppConfig, TerminalMode};

#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeArg {
    Prompt,
    Stream,
    Hud,
}

impl From<ModeArg> for TerminalMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Prompt => TerminalMode::Prompt,
            ModeArg::Stream => TerminalMode::Stream,
            ModeArg::Hud => TerminalMode::Hud,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "tilt", version, about = "Start the engine and choose how to watch it")]
pub struct Args {
    /// Host the web UI listens on.
    #[arg(long)]
    pub host: Option<String>,

    /// Port of the web UI. 0 disables it.
    #[arg(long)]
    pub port: Option<u16>,

    /// Start without the browser UI.
    #[arg(long)]
    pub no_browser_ui: bool,

    /// Initial terminal mode.
    /// - prompt: ask which view to open
    /// - stream: print logs
    /// - hud: terminal HUD
    #[arg(long, value_enum)]
    pub mode: Option<ModeArg>,
}

impl Args {
    /// Flags win over the config file and the environment.
    pub fn apply(&self, cfg: &mut AppConfig) {
        if let Some(host) = self.host.as_deref().map(str::trim).filter(|h| !h.is_empty()) {
            cfg.web.host = host.to_string();
        }
        if let Some(port) = self.port {
            cfg.web.port = port;
        }
        if self.no_browser_ui {
            cfg.web.enabled = false;
        }
        if let Some(mode) = self.mode {
            cfg.terminal.mode = mode.into();
        }
    }
}
