use clap::Parser;
mod browser;
mod cli;
mod subscribers;
mod tty;
use std::sync::Arc;
use subscribers::{LogStreamer, ModeAnnouncer};
use tilt_core::api::{
    BuildInfo, CancelToken, CliError, EngineReducer, EngineState, LogAction, OutputSink, Store,
    StoreError, TerminalMode, TerminalPrompt,
};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

static LOG_GUARD: std::sync::OnceLock<tracing_appender::non_blocking::WorkerGuard> =
    std::sync::OnceLock::new();

#[tokio::main]
async fn main() {
    let exit = match real_main().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{e}");
            exit_code_for_error(&e)
        }
    };

    std::process::exit(exit);
}

async fn real_main() -> Result<i32, CliError> {
    let args = cli::Args::parse();
    let mut cfg = tilt_core::api::load_default().map_err(|e| CliError::Config(e.to_string()))?;
    args.apply(&mut cfg);
    init_tracing(&cfg.logging)?;

    let mut init_output = Vec::new();
    match tilt_core::api::locate_config() {
        Ok(Some(path)) => init_output.push(format!("Loaded config from {}", path.display())),
        Ok(None) => {}
        Err(e) => tracing::debug!("locate config failed: {}", e),
    }

    let mut mode = cfg.terminal.mode;
    if mode == TerminalMode::Prompt && !atty::is(atty::Stream::Stdin) {
        tracing::info!("stdin is not a terminal, streaming logs instead of prompting");
        mode = TerminalMode::Stream;
    }

    let build = BuildInfo::current();
    let stdout = OutputSink::new(tty::CrlfWriter::new(std::io::stdout()));
    let store = Store::with_config(
        EngineState::new(mode, build.clone()),
        EngineReducer,
        cfg.store.clone(),
    );

    let prompt = Arc::new(TerminalPrompt::new(
        tty::terminal_opener(),
        browser::browser_opener(),
        stdout.clone(),
        cfg.web.host(),
        cfg.web.url(),
    ));
    prompt.set_init_output(init_output.join("\n"));
    store.add_subscriber(prompt.clone());
    store.add_subscriber(Arc::new(ModeAnnouncer::new(stdout.clone())));
    store.add_subscriber(Arc::new(LogStreamer::new(stdout)));

    let started_at = store.read_state().await.started_at;
    store.dispatch(LogAction::new(format!(
        "Tilt engine {} started at {} in {} mode",
        build.human_build_stamp(),
        started_at.with_timezone(&chrono::Local).format("%H:%M:%S"),
        mode
    )));
    if !cfg.web.url().is_empty() {
        store.dispatch(LogAction::new(format!("Web UI: {}", cfg.web.url())));
    }

    let cancel = CancelToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("interrupt received, shutting down");
                cancel.cancel();
            }
        });
    }

    let result = store.run(cancel).await;
    prompt.wait().await;
    let uptime = store
        .with_read_lock(|state| state.uptime_at(chrono::Utc::now()))
        .await;
    tracing::info!(uptime_secs = uptime.num_seconds(), ok = result.is_ok(), "engine stopped");
    result?;
    Ok(0)
}

fn exit_code_for_error(e: &CliError) -> i32 {
    // 0: success
    // 1: the engine stopped on a fatal error
    // 11: config error
    // 20: IO error
    // 50: internal/uncategorized
    match e {
        CliError::Config(_) => 11,
        CliError::Store(StoreError::Fatal(_)) => 1,
        CliError::Store(StoreError::AlreadyRunning) => 50,
        CliError::Io(_) => 20,
    }
}

fn init_tracing(logging: &tilt_core::api::LoggingConfig) -> Result<(), CliError> {
    if !logging.enabled {
        return Ok(());
    }

    let filter = match std::env::var("RUST_LOG") {
        Ok(v) if !v.trim().is_empty() => EnvFilter::from_default_env(),
        _ => EnvFilter::try_new(logging.level.clone())
            .map_err(|e| CliError::Config(format!("logging.level: {e}")))?,
    };

    let mut maybe_writer = None;

    if logging.file {
        let dir = match logging
            .directory
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
        {
            Some(d) => std::path::PathBuf::from(d),
            None => std::env::temp_dir().join("tilt"),
        };

        std::fs::create_dir_all(&dir)?;
        let file_name = format!("tilt.{}.log", std::process::id());
        let appender = tracing_appender::rolling::never(dir, file_name);
        let (non_blocking, guard) = tracing_appender::non_blocking(appender);
        let _ = LOG_GUARD.set(guard);
        maybe_writer = Some(non_blocking);
    }

    if !logging.console && maybe_writer.is_none() {
        return Err(CliError::Config(
            "logging disabled for both console and file".to_string(),
        ));
    }

    let console_layer = logging.console.then(|| {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_ansi(atty::is(atty::Stream::Stderr))
    });

    let file_layer = maybe_writer.map(|w| {
        tracing_subscriber::fmt::layer()
            .with_writer(w)
            .with_ansi(false)
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(file_layer)
        .init();

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(exit_code_for_error(&CliError::Config("bad".into())), 11);
        assert_eq!(
            exit_code_for_error(&CliError::Store(StoreError::Fatal("tty gone".into()))),
            1
        );
        assert_eq!(exit_code_for_error(&CliError::Store(StoreError::AlreadyRunning)), 50);
        assert_eq!(
            exit_code_for_error(&CliError::Io(std::io::Error::other("disk"))),
            20
        );
    }

    #[test]
    fn test_unusable_log_directory_is_io_error() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let logging = tilt_core::api::LoggingConfig {
            directory: Some(file.path().join("logs").display().to_string()),
            ..Default::default()
        };
        let err = init_tracing(&logging).unwrap_err();
        assert!(matches!(err, CliError::Io(_)), "{err}");
        assert_eq!(exit_code_for_error(&err), 20);
    }

    #[test]
    fn test_logging_needs_a_sink() {
        let logging = tilt_core::api::LoggingConfig {
            console: false,
            file: false,
            ..Default::default()
        };
        let err = init_tracing(&logging).unwrap_err();
        assert!(matches!(err, CliError::Config(_)), "{err}");
    }

    #[test]
    fn test_logging_disabled_is_noop() {
        let logging = tilt_core::api::LoggingConfig {
            enabled: false,
            ..Default::default()
        };
        assert!(init_tracing(&logging).is_ok());
    }
}
