//! Configuration management for quiztrack
//!
//! Provides TOML-based configuration with defaults and validation.
//! Location: ~/.quiztrack/config.toml

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::errors::{QuizError, Result};
use crate::session::PersistenceConfig;

/// Complete configuration for quiztrack
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub report: ReportConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Where sessions live
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub sessions_dir: String,
}

/// Report rendering configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub color: bool,
    /// Hide correctly answered rows by default
    pub quiet: bool,
}

/// Log output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default level when RUST_LOG is unset
    pub level: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            sessions_dir: "./sessions".to_string(),
        }
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            color: true,
            quiet: false,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from file or use defaults
    pub fn load(path: Option<PathBuf>) -> Result<Self> {
        if let Some(config_path) = path {
            Self::load_from_file(&config_path)
        } else {
            Self::load_default()
        }
    }

    /// Load configuration from specific file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| QuizError::ConfigError(format!("Failed to read config: {}", e)))?;

        let config: Config = toml::from_str(&contents)
            .map_err(|e| QuizError::ConfigError(format!("Failed to parse config: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Load default configuration from standard location or use built-in defaults
    pub fn load_default() -> Result<Self> {
        if let Some(home) = dirs::home_dir() {
            let config_path = home.join(".quiztrack").join("config.toml");
            if config_path.exists() {
                return Self::load_from_file(&config_path);
            }
        }

        Ok(Config::default())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.storage.sessions_dir.trim().is_empty() {
            return Err(QuizError::ConfigError(
                "sessions_dir must not be empty".to_string(),
            ));
        }

        match self.logging.level.as_str() {
            "error" | "warn" | "info" | "debug" | "trace" => {}
            _ => {
                return Err(QuizError::ConfigError(format!(
                    "Invalid log level: {}",
                    self.logging.level
                )))
            }
        }

        Ok(())
    }

    /// Save configuration to file
    pub fn save(&self, path: &Path) -> Result<()> {
        let contents = toml::to_string_pretty(self)
            .map_err(|e| QuizError::ConfigError(format!("Failed to serialize config: {}", e)))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| QuizError::ConfigError(format!("Failed to create config dir: {}", e)))?;
        }

        std::fs::write(path, contents)
            .map_err(|e| QuizError::ConfigError(format!("Failed to write config: {}", e)))?;

        Ok(())
    }

    /// Expand tilde in paths
    pub fn expand_path(path: &str) -> PathBuf {
        if let Some(rest) = path.strip_prefix("~/") {
            if let Some(home) = dirs::home_dir() {
                return home.join(rest);
            }
        }
        PathBuf::from(path)
    }

    /// Get sessions directory path
    pub fn sessions_dir(&self) -> PathBuf {
        Self::expand_path(&self.storage.sessions_dir)
    }

    /// Persistence settings for the session store
    pub fn persistence(&self) -> PersistenceConfig {
        PersistenceConfig {
            sessions_dir: self.sessions_dir(),
        }
    }
}
