use std::path::PathBuf;
use std::time::Duration;

use anyhow::{anyhow, Result};
use clap::Parser;
use tracing::info;

use chatline_core::{Config, FileStore, HttpBackend};

mod app;
mod bindings;
mod logging;
mod surface;
mod tui;
mod ui;

use app::App;
use tui::EventHandler;

#[derive(Parser, Debug)]
#[command(name = "chatline", version)]
#[command(about = "Terminal chat widget with a typing effect and persistent history")]
struct Cli {
    /// Chat backend URL (overrides config and CHATLINE_ENDPOINT)
    #[arg(short, long)]
    endpoint: Option<String>,

    /// Config file to use instead of the default location
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// File holding the stored conversation
    #[arg(long)]
    history: Option<PathBuf>,

    /// Milliseconds per revealed character
    #[arg(long)]
    speed: Option<u64>,

    /// Give up on a backend request after this many seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Log file (defaults to the data directory)
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Log level filter; RUST_LOG takes precedence
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Write the effective configuration back to the config file
    #[arg(long)]
    save_config: bool,
}

impl Cli {
    fn load_config(&self) -> Result<Config> {
        let mut config = match &self.config {
            Some(path) => {
                let mut config = Config::load_from(path)?;
                config.apply_env();
                config
            }
            None => Config::load()?,
        };

        if let Some(endpoint) = &self.endpoint {
            config.endpoint = endpoint.clone();
        }
        if let Some(history) = &self.history {
            config.storage_path = Some(history.clone());
        }
        if let Some(speed) = self.speed {
            config.reveal_speed_ms = speed;
        }
        if let Some(timeout) = self.timeout {
            config.request_timeout_secs = Some(timeout);
        }

        Ok(config)
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = cli.load_config()?;

    if cli.save_config {
        match &cli.config {
            Some(path) => config.save_to(path)?,
            None => config.save()?,
        }
    }

    let log_file = cli.log_file.clone().unwrap_or_else(logging::default_log_path);
    logging::init_tracing(&log_file, &cli.log_level)?;

    let storage_path = config
        .storage_path
        .clone()
        .or_else(FileStore::default_path)
        .ok_or_else(|| anyhow!("Could not determine data directory"))?;
    info!(endpoint = %config.endpoint, storage = %storage_path.display(), "starting chatline");

    let backend = HttpBackend::with_timeout(&config.endpoint, config.request_timeout())?;
    let mut app = App::new(&config, backend, FileStore::new(storage_path));

    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let mut events = EventHandler::new(Duration::from_millis(300));

    let result = app.run(&mut terminal, &mut events).await;

    tui::restore()?;
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_overrides_config() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("config.json");
        std::fs::write(&config_path, r#"{"endpoint":"http://file.test/chat","reveal_speed_ms":50}"#).unwrap();

        let cli = Cli::parse_from([
            "chatline",
            "--config",
            config_path.to_str().unwrap(),
            "--speed",
            "10",
            "--history",
            "/tmp/chat.json",
            "--timeout",
            "15",
        ]);
        let config = cli.load_config().unwrap();

        assert_eq!(config.reveal_speed_ms, 10);
        assert_eq!(config.storage_path, Some(PathBuf::from("/tmp/chat.json")));
        assert_eq!(config.request_timeout_secs, Some(15));
        if std::env::var(chatline_core::config::ENDPOINT_ENV).is_err() {
            assert_eq!(config.endpoint, "http://file.test/chat");
        }
    }

    #[test]
    fn test_endpoint_flag_wins() {
        let dir = tempfile::tempdir().unwrap();
        let cli = Cli::parse_from([
            "chatline",
            "--config",
            dir.path().join("missing.json").to_str().unwrap(),
            "-e",
            "http://flag.test/chat",
        ]);
        assert_eq!(cli.load_config().unwrap().endpoint, "http://flag.test/chat");
    }
}
