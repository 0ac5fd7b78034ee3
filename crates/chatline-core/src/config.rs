use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::clock;
use crate::error::ConfigError;
use crate::render::Avatars;

pub const ENDPOINT_ENV: &str = "CHATLINE_ENDPOINT";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    /// Chat backend URL receiving `POST {"message": ...}`
    pub endpoint: String,
    /// Delay between revealed characters
    pub reveal_speed_ms: u64,
    /// chrono format string for bubble timestamps
    pub timestamp_format: String,
    pub user_avatar: String,
    pub bot_avatar: String,
    /// Where history is stored; defaults to the platform data directory
    pub storage_path: Option<PathBuf>,
    /// Give up on a backend request after this many seconds. Unset waits forever.
    pub request_timeout_secs: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        let avatars = Avatars::default();
        Self {
            endpoint: "http://localhost:5000/chat".to_string(),
            reveal_speed_ms: 30,
            timestamp_format: clock::DEFAULT_FORMAT.to_string(),
            user_avatar: avatars.user,
            bot_avatar: avatars.bot,
            storage_path: None,
            request_timeout_secs: None,
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from the default location, falling back to defaults when the
    /// file does not exist. The endpoint environment variable wins over the
    /// file.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::load_from(&Self::get_config_path()?)?;
        config.apply_env();
        Ok(config)
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::new());
        }

        let config_content = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&config_content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that would only fail later, mid-session.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !clock::is_valid_format(&self.timestamp_format) {
            return Err(ConfigError::TimestampFormat(self.timestamp_format.clone()));
        }
        Ok(())
    }

    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::get_config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        // Create config directory if it doesn't exist
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let config_content = serde_json::to_string_pretty(self)?;
        fs::write(path, config_content)?;
        Ok(())
    }

    pub fn apply_env(&mut self) {
        if let Ok(endpoint) = std::env::var(ENDPOINT_ENV) {
            if !endpoint.trim().is_empty() {
                self.endpoint = endpoint;
            }
        }
    }

    pub fn reveal_speed(&self) -> Duration {
        Duration::from_millis(self.reveal_speed_ms)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    pub fn avatars(&self) -> Avatars {
        Avatars {
            user: self.user_avatar.clone(),
            bot: self.bot_avatar.clone(),
        }
    }

    pub fn get_config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;

        Ok(config_dir.join("chatline").join("config.json"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("config.json")).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.reveal_speed(), Duration::from_millis(30));
        assert_eq!(config.request_timeout(), None);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"endpoint":"http://example.test/chat","request_timeout_secs":20}"#).unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.endpoint, "http://example.test/chat");
        assert_eq!(config.request_timeout(), Some(Duration::from_secs(20)));
        assert_eq!(config.timestamp_format, "%H:%M");
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let config = Config {
            reveal_speed_ms: 5,
            bot_avatar: "[ai]".to_string(),
            ..Config::default()
        };

        config.save_to(&path).unwrap();
        let reloaded = Config::load_from(&path).unwrap();
        assert_eq!(reloaded, config);
        assert_eq!(reloaded.avatars().bot, "[ai]");
    }

    #[test]
    fn test_invalid_file_is_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "reveal_speed_ms = 3").unwrap();
        assert!(matches!(Config::load_from(&path), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_bad_timestamp_format_is_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"timestamp_format":"%H:%Q"}"#).unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(matches!(err, ConfigError::TimestampFormat(ref f) if f == "%H:%Q"));

        fs::write(&path, r#"{"timestamp_format":"%-I:%M %p"}"#).unwrap();
        assert_eq!(Config::load_from(&path).unwrap().timestamp_format, "%-I:%M %p");
    }
}
