use crate::domain::{
    config::PrintLinkConfig,
    error::{PrintLinkError, PrintLinkResult},
};
use std::fs;
use std::path::{Path, PathBuf};

/// Loads and saves the TOML configuration file
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    /// Manager over the default platform config path
    pub fn new() -> PrintLinkResult<Self> {
        Ok(Self {
            config_path: Self::default_config_path()?,
        })
    }

    /// Manager over an explicit path
    pub fn with_path(config_path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: config_path.into(),
        }
    }

    /// Load the configuration, falling back to defaults when the file does
    /// not exist yet
    pub fn load_config(&self) -> PrintLinkResult<PrintLinkConfig> {
        if !self.config_path.exists() {
            return Ok(PrintLinkConfig::default());
        }
        Self::load_from_path(&self.config_path)
    }

    /// Save the configuration, creating parent directories as needed
    pub fn save_config(&self, config: &PrintLinkConfig) -> PrintLinkResult<()> {
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent).map_err(|e| PrintLinkError::Config {
                message: format!("Failed to create config directory: {}", e),
            })?;
        }

        let content = toml::to_string_pretty(config).map_err(|e| PrintLinkError::Config {
            message: format!("Failed to serialize config: {}", e),
        })?;
        fs::write(&self.config_path, content).map_err(|e| PrintLinkError::Config {
            message: format!(
                "Failed to write config file {}: {}",
                self.config_path.display(),
                e
            ),
        })
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    fn default_config_path() -> PrintLinkResult<PathBuf> {
        let base = dirs::config_dir().ok_or_else(|| PrintLinkError::Config {
            message: "Could not determine config directory".to_string(),
        })?;
        Ok(base.join("printlink").join("config.toml"))
    }

    fn load_from_path(path: &Path) -> PrintLinkResult<PrintLinkConfig> {
        let content = fs::read_to_string(path).map_err(|e| PrintLinkError::Config {
            message: format!("Failed to read config file {}: {}", path.display(), e),
        })?;
        toml::from_str(&content).map_err(|e| PrintLinkError::Config {
            message: format!("Failed to parse config file {}: {}", path.display(), e),
        })
    }
}
