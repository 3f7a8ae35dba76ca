pub mod types;

pub use types::*;

use crate::error::AppError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// ffmpeg invocation settings
    pub ffmpeg: FfmpegConfig,
    /// Batch defaults
    pub batch: BatchConfig,
}

impl AppConfig {
    /// Load configuration from `path` (or the default location), creating a
    /// default file if none exists yet.
    pub fn load(path: Option<&Path>) -> Self {
        let config_path = path.map(Path::to_path_buf).unwrap_or_else(Self::config_path);

        if config_path.exists() {
            match Self::load_from_file(&config_path) {
                Ok(config) => {
                    info!("Loaded config from {}", config_path.display());
                    return config;
                }
                Err(e) => {
                    warn!("Failed to load config: {}. Using defaults.", e);
                    return Self::default();
                }
            }
        }

        let config = Self::default();
        // Save default config for future editing
        if let Err(e) = config.save_to(&config_path) {
            warn!("Failed to save default config: {}", e);
        }
        config
    }

    /// Save configuration to a TOML file
    pub fn save_to(&self, path: &Path) -> Result<(), AppError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                AppError::Config(format!("Failed to create config directory: {}", e))
            })?;
        }

        let toml_string = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_string)
            .map_err(|e| AppError::Config(format!("Failed to write config file: {}", e)))?;

        info!("Saved config to {}", path.display());
        Ok(())
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: &Path) -> Result<Self, AppError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| AppError::Config(format!("Failed to read config file: {}", e)))?;
        let config: AppConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("peg")
            .join("config.toml")
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), AppError> {
        if self.ffmpeg.path.as_os_str().is_empty() {
            return Err(AppError::Config("ffmpeg path must not be empty".to_string()));
        }
        Ok(())
    }
}
