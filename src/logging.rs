use color_eyre::eyre::{eyre, Result};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

pub const LOG_FILTER_ENV: &str = "DCW_LOG";
const LOG_FILE: &str = "debug.log";

/// `$XDG_STATE_HOME/dcw`, else `~/.local/state/dcw`, else `./.dcw`.
pub fn state_dir() -> PathBuf {
    resolve_state_dir(
        std::env::var_os("XDG_STATE_HOME").map(PathBuf::from),
        std::env::var_os("HOME").map(PathBuf::from),
    )
}

fn resolve_state_dir(xdg_state_home: Option<PathBuf>, home: Option<PathBuf>) -> PathBuf {
    match (xdg_state_home, home) {
        (Some(xdg), _) if xdg.is_absolute() => xdg.join("dcw"),
        (_, Some(home)) => home.join(".local").join("state").join("dcw"),
        _ => PathBuf::from(".dcw"),
    }
}

/// Sends `tracing` output to `<state_dir>/debug.log`. The terminal belongs to
/// the TUI, so nothing is written to stdout or stderr.
pub fn setup_verbose_logging(state_dir: &Path) -> Result<PathBuf> {
    std::fs::create_dir_all(state_dir)
        .map_err(|e| eyre!("Failed to create state directory {state_dir:?}: {e}"))?;
    let path = state_dir.join(LOG_FILE);
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .map_err(|e| eyre!("Failed to open {path:?}: {e}"))?;

    let filter = EnvFilter::try_from_env(LOG_FILTER_ENV).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::sync::Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .try_init()
        .map_err(|e| eyre!("Failed to install log subscriber: {e}"))?;
    Ok(path)
}
