use crate::app::{AppConfig, DEFAULT_BASE_URL};
use clap::Parser;

const VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), "+", env!("BUILD_NUMBER"));

#[derive(Parser, Debug)]
#[command(name = "dcw", version = VERSION, about = "Docker Compose Watcher TUI")]
pub struct Cli {
    /// Base URL of the compose control backend
    #[arg(short, long, env = "DCW_URL", default_value = DEFAULT_BASE_URL)]
    pub url: String,

    /// Refresh interval in seconds
    #[arg(short, long, default_value_t = crate::sync::REFRESH_INTERVAL_SECS)]
    pub interval: u64,

    /// Disable desktop notifications
    #[arg(long)]
    pub no_notify: bool,

    /// Do not capture the mouse (keyboard only)
    #[arg(long)]
    pub no_mouse: bool,

    /// Write a debug log to the state directory (filter with DCW_LOG)
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    pub fn config(&self) -> AppConfig {
        AppConfig {
            base_url: self.url.clone(),
            interval_secs: self.interval.max(1),
            desktop_notify: !self.no_notify,
            mouse: !self.no_mouse,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cli = Cli::try_parse_from(["dcw"]).unwrap();
        let config = cli.config();
        assert_eq!(config.interval_secs, 30);
        assert!(config.desktop_notify);
        assert!(config.mouse);
        assert!(!cli.verbose);
    }

    #[test]
    fn flags_flow_into_config() {
        let cli = Cli::try_parse_from([
            "dcw",
            "--url",
            "http://panel:8080/",
            "--interval",
            "0",
            "--no-notify",
            "--no-mouse",
        ])
        .unwrap();
        let config = cli.config();
        assert_eq!(config.base_url, "http://panel:8080/");
        assert_eq!(config.interval_secs, 1);
        assert!(!config.desktop_notify);
        assert!(!config.mouse);
    }
}
