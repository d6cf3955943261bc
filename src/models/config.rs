//! Application configuration structures.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Root application configuration.
///
/// Layered as defaults, then an optional TOML file, then environment
/// variables (see [`Config::apply_env`]).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Upstream API access and HTTP behaviour
    #[serde(default)]
    pub youtube: YouTubeConfig,

    /// Collection bounds used when the CLI does not override them
    #[serde(default)]
    pub collection: CollectionConfig,

    /// Where collected and derived tables are written
    #[serde(default)]
    pub output: OutputConfig,

    /// Log verbosity
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Overlay values from the process environment.
    pub fn with_env(mut self) -> Self {
        self.apply_env(|key| std::env::var(key).ok());
        self
    }

    /// Overlay values from an environment lookup.
    ///
    /// Unparseable numeric values are ignored with a warning and the
    /// previous value is kept.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(key) = lookup("YOUTUBE_API_KEY") {
            self.youtube.api_key = key.trim().to_string();
        }
        if let Some(raw) = lookup("DEFAULT_MAX_RESULTS") {
            match raw.trim().parse() {
                Ok(n) => self.collection.default_max_results = n,
                Err(_) => log::warn!("Ignoring invalid DEFAULT_MAX_RESULTS={raw:?}"),
            }
        }
        if let Some(dir) = lookup("OUTPUT_DIR") {
            self.output.dir = dir;
        }
        if let Some(level) = lookup("LOG_LEVEL") {
            self.logging.level = level.trim().to_lowercase();
        }
        if let Some(raw) = lookup("YOUTUBE_REQUEST_DELAY") {
            match raw.trim().parse::<f64>() {
                Ok(secs) if secs >= 0.0 => {
                    self.youtube.request_delay_ms = (secs * 1000.0).round() as u64
                }
                _ => log::warn!("Ignoring invalid YOUTUBE_REQUEST_DELAY={raw:?}"),
            }
        }
        if let Some(raw) = lookup("INCLUDE_REPLIES") {
            self.collection.include_replies = raw.trim().eq_ignore_ascii_case("true");
        }
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.youtube.api_key.trim().is_empty() {
            return Err(AppError::config(
                "YouTube API key is not set (YOUTUBE_API_KEY or --api-key)",
            ));
        }
        if self.youtube.timeout_secs == 0 {
            return Err(AppError::validation("youtube.timeout_secs must be > 0"));
        }
        if self.youtube.user_agent.trim().is_empty() {
            return Err(AppError::validation("youtube.user_agent is empty"));
        }
        if self.collection.default_max_results == 0 {
            return Err(AppError::validation(
                "collection.default_max_results must be > 0",
            ));
        }
        if self.collection.default_max_videos == 0 {
            return Err(AppError::validation(
                "collection.default_max_videos must be > 0",
            ));
        }
        Ok(())
    }
}

/// YouTube Data API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct YouTubeConfig {
    /// API key sent as the `key` query parameter
    #[serde(default)]
    pub api_key: String,

    /// API root, overridable for local testing
    #[serde(default = "defaults::base_url")]
    pub base_url: String,

    /// Fixed delay before every API call in milliseconds
    #[serde(default = "defaults::request_delay")]
    pub request_delay_ms: u64,

    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,
}

impl Default for YouTubeConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: defaults::base_url(),
            request_delay_ms: defaults::request_delay(),
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
        }
    }
}

/// Default collection bounds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionConfig {
    #[serde(default = "defaults::max_results")]
    pub default_max_results: usize,

    #[serde(default = "defaults::max_videos")]
    pub default_max_videos: usize,

    #[serde(default = "defaults::include_replies")]
    pub include_replies: bool,
}

impl Default for CollectionConfig {
    fn default() -> Self {
        Self {
            default_max_results: defaults::max_results(),
            default_max_videos: defaults::max_videos(),
            include_replies: defaults::include_replies(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "defaults::output_dir")]
    pub dir: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: defaults::output_dir(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "defaults::log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::log_level(),
        }
    }
}

mod defaults {
    // YouTube defaults
    pub fn base_url() -> String {
        "https://www.googleapis.com/youtube/v3".into()
    }
    pub fn request_delay() -> u64 {
        200
    }
    pub fn user_agent() -> String {
        "Mozilla/5.0 (compatible; social-collector/0.1)".into()
    }
    pub fn timeout() -> u64 {
        30
    }

    // Collection defaults
    pub fn max_results() -> usize {
        50
    }
    pub fn max_videos() -> usize {
        10
    }
    pub fn include_replies() -> bool {
        true
    }

    pub fn output_dir() -> String {
        "collected_data".into()
    }
    pub fn log_level() -> String {
        "info".into()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn with_key() -> Config {
        let mut config = Config::default();
        config.youtube.api_key = "test-key".to_string();
        config
    }

    #[test]
    fn validate_rejects_missing_api_key() {
        let err = Config::default().validate().unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }

    #[test]
    fn validate_accepts_defaults_with_key() {
        assert!(with_key().validate().is_ok());
    }

    #[test]
    fn validate_rejects_zero_caps() {
        let mut config = with_key();
        config.collection.default_max_results = 0;
        assert!(config.validate().is_err());

        let mut config = with_key();
        config.youtube.timeout_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn env_overrides_defaults() {
        let env: HashMap<&str, &str> = [
            ("YOUTUBE_API_KEY", " abc "),
            ("DEFAULT_MAX_RESULTS", "120"),
            ("OUTPUT_DIR", "out"),
            ("LOG_LEVEL", "DEBUG"),
            ("YOUTUBE_REQUEST_DELAY", "0.5"),
            ("INCLUDE_REPLIES", "False"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.apply_env(|k| env.get(k).map(|v| v.to_string()));

        assert_eq!(config.youtube.api_key, "abc");
        assert_eq!(config.collection.default_max_results, 120);
        assert_eq!(config.output.dir, "out");
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.youtube.request_delay_ms, 500);
        assert!(!config.collection.include_replies);
    }

    #[test]
    fn invalid_env_numbers_keep_previous_values() {
        let mut config = Config::default();
        config.apply_env(|k| match k {
            "DEFAULT_MAX_RESULTS" => Some("lots".to_string()),
            "YOUTUBE_REQUEST_DELAY" => Some("-1".to_string()),
            _ => None,
        });
        assert_eq!(config.collection.default_max_results, 50);
        assert_eq!(config.youtube.request_delay_ms, 200);
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let config: Config = toml::from_str(
            r#"
            [youtube]
            api_key = "k"

            [collection]
            default_max_videos = 3
            "#,
        )
        .unwrap();
        assert_eq!(config.youtube.api_key, "k");
        assert_eq!(config.youtube.request_delay_ms, 200);
        assert_eq!(config.collection.default_max_videos, 3);
        assert_eq!(config.collection.default_max_results, 50);
        assert_eq!(config.output.dir, "collected_data");
    }
}
