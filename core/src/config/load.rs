use std::path::{Path, PathBuf};

use super::types::AppConfig;

/// Get the default tilt data directory: ~/.tilt
pub fn get_tilt_data_dir() -> anyhow::Result<PathBuf> {
    let home = dirs::home_dir().ok_or_else(|| anyhow::anyhow!("Cannot determine home directory"))?;
    Ok(home.join(".tilt"))
}

pub fn load_from(path: &Path) -> anyhow::Result<AppConfig> {
    let s = std::fs::read_to_string(path)?;
    let cfg = toml::from_str::<AppConfig>(&s)
        .map_err(|e| anyhow::anyhow!("{}: {}", path.display(), e))?;
    Ok(cfg)
}

/// The config file `load_default` reads, if any.
pub fn locate_config() -> anyhow::Result<Option<PathBuf>> {
    // Priority 1: ~/.tilt/config.toml
    let user_config = get_tilt_data_dir()?.join("config.toml");
    if user_config.exists() {
        return Ok(Some(user_config));
    }

    // Priority 2: ./tilt.toml (current directory)
    let local_config = PathBuf::from("tilt.toml");
    if local_config.exists() {
        return Ok(Some(local_config));
    }

    Ok(None)
}

pub fn load_default() -> anyhow::Result<AppConfig> {
    let mut cfg = match locate_config()? {
        Some(path) => load_from(&path)?,
        None => AppConfig::default(),
    };

    apply_env_overrides(&mut cfg, |key| std::env::var(key).ok())?;
    Ok(cfg)
}

/// Environment variable overrides (highest priority). `lookup` is injected so
/// the rules can be tested without touching the process environment.
pub fn apply_env_overrides(
    cfg: &mut AppConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> anyhow::Result<()> {
    let value = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(v) = value("TILT_HOST") {
        cfg.web.host = v.trim().to_string();
    }
    if let Some(v) = value("TILT_PORT") {
        cfg.web.port = v
            .trim()
            .parse()
            .map_err(|e| anyhow::anyhow!("TILT_PORT={v}: {e}"))?;
    }
    if let Some(v) = value("TILT_TERMINAL_MODE") {
        cfg.terminal.mode = v.parse().map_err(|e: String| anyhow::anyhow!(e))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::TerminalMode;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[web]\nport = 9000\n\n[store]\nmax_batch = 8\n\n[logging]\nlevel = \"debug\""
        )
        .unwrap();

        let cfg = load_from(file.path()).unwrap();
        assert_eq!(cfg.web.port, 9000);
        assert_eq!(cfg.store.max_batch, 8);
        assert_eq!(cfg.logging.level, "debug");
        assert_eq!(cfg.terminal.mode, TerminalMode::Prompt);
    }

    #[test]
    fn test_load_from_invalid_file_names_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[web\nport = ").unwrap();

        let err = load_from(file.path()).unwrap_err().to_string();
        assert!(err.contains(&file.path().display().to_string()));
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("TILT_HOST", "0.0.0.0"),
            ("TILT_PORT", "10351"),
            ("TILT_TERMINAL_MODE", "stream"),
        ]
        .into_iter()
        .collect();

        let mut cfg = AppConfig::default();
        apply_env_overrides(&mut cfg, |k| env.get(k).map(|v| v.to_string())).unwrap();
        assert_eq!(cfg.web.host, "0.0.0.0");
        assert_eq!(cfg.web.port, 10351);
        assert_eq!(cfg.terminal.mode, TerminalMode::Stream);
    }

    #[test]
    fn test_env_overrides_reject_bad_port() {
        let mut cfg = AppConfig::default();
        let result = apply_env_overrides(&mut cfg, |k| {
            (k == "TILT_PORT").then(|| "not-a-port".to_string())
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_blank_env_values_are_ignored() {
        let mut cfg = AppConfig::default();
        apply_env_overrides(&mut cfg, |_| Some("  ".to_string())).unwrap();
        assert_eq!(cfg.web.host, "localhost");
    }
}
