//! 状态类型定义

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::logs::LogBuffer;

/// 引擎状态
///
/// 除终端交互模式和构建信息外，还记录日志缓冲以及退出信号。
#[derive(Debug, Clone, PartialEq)]
pub struct EngineState {
    /// 当前终端交互模式
    pub terminal_mode: TerminalMode,
    /// 构建/版本信息
    pub build: BuildInfo,
    /// 引擎启动时间
    pub started_at: DateTime<Utc>,
    /// 最近的日志行
    pub logs: LogBuffer,
    /// 第一个致命错误
    pub fatal_error: Option<String>,
    /// 一旦置位，Store 在本轮通知后停止
    pub exit_signal: bool,
}

impl EngineState {
    pub fn new(terminal_mode: TerminalMode, build: BuildInfo) -> Self {
        Self {
            terminal_mode,
            build,
            started_at: Utc::now(),
            logs: LogBuffer::default(),
            fatal_error: None,
            exit_signal: false,
        }
    }

    /// 自启动以来经过的时间
    pub fn uptime_at(&self, now: DateTime<Utc>) -> chrono::Duration {
        (now - self.started_at).max(chrono::Duration::zero())
    }

    /// 记录致命错误并请求退出，只保留第一个错误。
    pub fn record_fatal(&mut self, error: String) {
        if self.fatal_error.is_none() {
            self.fatal_error = Some(error);
        }
        self.exit_signal = true;
    }
}

impl Default for EngineState {
    fn default() -> Self {
        Self::new(TerminalMode::default(), BuildInfo::current())
    }
}

/// 终端交互模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TerminalMode {
    /// 启动提示，等待用户选择
    #[default]
    Prompt,
    /// 日志流
    Stream,
    /// 终端 HUD
    Hud,
}

impl TerminalMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Prompt => "prompt",
            Self::Stream => "stream",
            Self::Hud => "hud",
        }
    }
}

impl fmt::Display for TerminalMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TerminalMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "prompt" => Ok(Self::Prompt),
            "stream" => Ok(Self::Stream),
            "hud" => Ok(Self::Hud),
            other => Err(format!("unknown terminal mode: {other}")),
        }
    }
}

/// 构建信息
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildInfo {
    pub version: String,
    pub date: String,
    pub dev: bool,
}

impl BuildInfo {
    /// 当前 crate 的构建信息，debug 构建视为开发版本。
    pub fn current() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            date: option_env!("TILT_BUILD_DATE").unwrap_or("unknown").to_string(),
            dev: cfg!(debug_assertions),
        }
    }

    pub fn human_build_stamp(&self) -> String {
        if self.dev {
            format!("v{}-dev", self.version)
        } else {
            format!("v{}, built {}", self.version, self.date)
        }
    }
}
