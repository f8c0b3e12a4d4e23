//! Collector configuration
//!
//! Centralized configuration with runtime defaults, optional TOML file
//! loading, environment variable overrides, and validation. Loaded once
//! into a process-wide `OnceLock`.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing::info;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Logging configuration
    pub logging: LoggingConfig,

    /// Source and state file locations
    pub paths: PathsConfig,

    /// Collection cycle scheduling
    pub collection: CollectionConfig,

    /// Deduplication state retention
    pub dedup: DedupConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
    pub output: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    pub claude_home: PathBuf,
    pub state_file: PathBuf,
    pub log_directory: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionConfig {
    pub interval_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DedupConfig {
    pub max_tracked_records: usize,
}

impl Default for Config {
    fn default() -> Self {
        let claude_home = dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".claude");
        Self {
            logging: LoggingConfig {
                level: "info".to_string(),
                format: "pretty".to_string(),
                output: "console".to_string(),
            },
            paths: PathsConfig {
                state_file: claude_home.join("token_dash_state.json"),
                claude_home,
                log_directory: PathBuf::from("logs"),
            },
            collection: CollectionConfig { interval_secs: 300 },
            dedup: DedupConfig {
                max_tracked_records: 10_000,
            },
        }
    }
}

impl Config {
    /// Load configuration from file (if present), then environment, then
    /// defaults.
    pub fn load() -> Result<Self> {
        let mut config = Config::default();

        let config_paths = [
            PathBuf::from("token-dash.toml"),
            PathBuf::from(".token-dash.toml"),
            dirs::config_dir()
                .map(|d| d.join("token-dash").join("config.toml"))
                .unwrap_or_default(),
        ];

        for path in &config_paths {
            if path.exists() {
                info!(config_file = %path.display(), "Loading configuration from file");
                config = Self::load_from_file(path)?;
                break;
            }
        }

        config.apply_env_overrides()?;
        config.validate()?;

        Ok(config)
    }

    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    pub fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(val) = env::var("LOG_LEVEL") {
            self.logging.level = val;
        }
        if let Ok(val) = env::var("LOG_FORMAT") {
            self.logging.format = val;
        }
        if let Ok(val) = env::var("LOG_OUTPUT") {
            self.logging.output = val;
        }

        if let Ok(val) = env::var("CLAUDE_HOME") {
            self.paths.claude_home = PathBuf::from(&val);
            // The state file follows the claude home unless pinned
            // explicitly below
            self.paths.state_file = self.paths.claude_home.join("token_dash_state.json");
        }
        if let Ok(val) = env::var("TOKEN_DASH_STATE_FILE") {
            self.paths.state_file = PathBuf::from(val);
        }
        if let Ok(val) = env::var("TOKEN_DASH_LOG_DIR") {
            self.paths.log_directory = PathBuf::from(val);
        }

        if let Ok(val) = env::var("TOKEN_DASH_INTERVAL_SECS") {
            self.collection.interval_secs =
                val.parse().context("Invalid TOKEN_DASH_INTERVAL_SECS")?;
        }
        if let Ok(val) = env::var("TOKEN_DASH_MAX_TRACKED_RECORDS") {
            self.dedup.max_tracked_records = val
                .parse()
                .context("Invalid TOKEN_DASH_MAX_TRACKED_RECORDS")?;
        }

        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.collection.interval_secs == 0 {
            return Err(anyhow::anyhow!("Collection interval must be greater than 0"));
        }

        if self.dedup.max_tracked_records == 0 {
            return Err(anyhow::anyhow!(
                "Max tracked records must be greater than 0"
            ));
        }

        // File logging needs the directory before the appender opens it
        if self.logging.output != "console" && !self.paths.log_directory.exists() {
            fs::create_dir_all(&self.paths.log_directory)
                .context("Failed to create log directory")?;
        }

        Ok(())
    }
}

static CONFIG: OnceLock<Config> = OnceLock::new();

/// Get the global configuration instance
pub fn get_config() -> &'static Config {
    CONFIG.get_or_init(|| Config::load().expect("Failed to load configuration"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.collection.interval_secs, 300);
        assert_eq!(config.dedup.max_tracked_records, 10_000);
        assert!(config
            .paths
            .state_file
            .ends_with("token_dash_state.json"));
    }

    #[test]
    fn test_env_override() {
        env::set_var("TOKEN_DASH_INTERVAL_SECS", "60");
        env::set_var("TOKEN_DASH_MAX_TRACKED_RECORDS", "500");
        let mut config = Config::default();
        config.apply_env_overrides().unwrap();
        assert_eq!(config.collection.interval_secs, 60);
        assert_eq!(config.dedup.max_tracked_records, 500);
        env::remove_var("TOKEN_DASH_INTERVAL_SECS");
        env::remove_var("TOKEN_DASH_MAX_TRACKED_RECORDS");
    }

    #[test]
    fn test_claude_home_override_moves_state_file() {
        env::set_var("CLAUDE_HOME", "/tmp/claude-test-home");
        let mut config = Config::default();
        config.apply_env_overrides().unwrap();
        assert_eq!(
            config.paths.state_file,
            PathBuf::from("/tmp/claude-test-home/token_dash_state.json")
        );
        env::remove_var("CLAUDE_HOME");
    }

    #[test]
    fn test_validation() {
        let mut config = Config::default();
        config.collection.interval_secs = 0;
        assert!(config.validate().is_err());
    }
}
