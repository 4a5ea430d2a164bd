//! Configuration module for the mdt CLI.
//!
//! Settings live in an `mdt.toml` file. Every field is optional and command
//! line flags override what the file says.

use dirs::{config_dir, home_dir};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use memdump_load::{LoadOptions, DEFAULT_EXPENSIVE_TYPES, DEFAULT_TOP};

use crate::error::{MdtError, Result};

/// Default configuration file name.
pub const CONFIG_FILE_NAME: &str = "mdt.toml";

/// Application configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    /// Rows shown by the summary style commands.
    #[serde(default = "default_top")]
    pub top: usize,

    /// Loader settings.
    #[serde(default)]
    pub load: LoadConfig,
}

/// Loader configuration options.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoadConfig {
    /// Replace references to expensive types with a placeholder.
    #[serde(default)]
    pub strip_expensive: bool,

    /// Type names treated as expensive.
    #[serde(default = "default_expensive_types")]
    pub expensive_types: Vec<String>,

    /// Lines between progress messages, 0 to disable.
    #[serde(default = "default_progress_interval")]
    pub progress_interval: u64,
}

fn default_top() -> usize {
    DEFAULT_TOP
}

fn default_expensive_types() -> Vec<String> {
    DEFAULT_EXPENSIVE_TYPES.iter().map(|t| (*t).to_string()).collect()
}

fn default_progress_interval() -> u64 {
    100_000
}

impl Default for Config {
    fn default() -> Self {
        Self {
            top: default_top(),
            load: LoadConfig::default(),
        }
    }
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            strip_expensive: false,
            expensive_types: default_expensive_types(),
            progress_interval: default_progress_interval(),
        }
    }
}

impl LoadConfig {
    /// Loader options for these settings.
    ///
    /// `strip_expensive` from the command line wins when set.
    pub fn to_options(&self, strip_expensive: bool, compute_referrers: bool) -> LoadOptions {
        LoadOptions {
            strip_expensive_refs: strip_expensive || self.strip_expensive,
            expensive_types: self.expensive_types.clone(),
            progress_interval: self.progress_interval,
            compute_referrers,
        }
    }
}

impl Config {
    /// Load configuration from the default location.
    ///
    /// Searches for configuration in the following order:
    /// 1. Current directory
    /// 2. `~/.config/mdt`
    /// 3. System configuration directory
    ///
    /// Returns the default configuration if no config file is found.
    pub fn load() -> Result<Self> {
        match Self::find_config_file() {
            Some(path) => Self::load_from_path(&path),
            None => Ok(Self::default()),
        }
    }

    /// Load configuration from a specific path.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(MdtError::Config(format!(
                "Configuration file not found: {}",
                path.display()
            )));
        }

        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| MdtError::Config(format!("Failed to parse configuration: {}", e)))?;

        Ok(config)
    }

    /// Save configuration to a specific path, creating parent directories.
    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| MdtError::Config(format!("Failed to serialize configuration: {}", e)))?;

        std::fs::write(path, content)?;
        Ok(())
    }

    fn check_current_dir_config() -> Option<PathBuf> {
        let path = PathBuf::from(CONFIG_FILE_NAME);
        path.exists().then_some(path)
    }

    fn check_home_config() -> Option<PathBuf> {
        home_dir()
            .map(|dir| dir.join(".config").join("mdt").join(CONFIG_FILE_NAME))
            .filter(|path| path.exists())
    }

    fn check_system_config() -> Option<PathBuf> {
        config_dir()
            .map(|dir| dir.join("mdt").join(CONFIG_FILE_NAME))
            .filter(|path| path.exists())
    }

    fn find_config_file() -> Option<PathBuf> {
        Self::check_current_dir_config()
            .or_else(Self::check_home_config)
            .or_else(Self::check_system_config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.top, 20);
        assert!(!config.load.strip_expensive);
        assert_eq!(config.load.expensive_types, ["module", "frame", "type"]);
        assert_eq!(config.load.progress_interval, 100_000);
    }

    #[test]
    fn test_config_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("nested").join("mdt.toml");

        let original = Config {
            top: 5,
            load: LoadConfig {
                strip_expensive: true,
                expensive_types: vec!["module".to_string()],
                progress_interval: 0,
            },
        };
        original.save_to_path(&config_path).unwrap();

        let loaded = Config::load_from_path(&config_path).unwrap();
        assert_eq!(original, loaded);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("mdt.toml");
        std::fs::write(&config_path, "top = 3\n").unwrap();

        let config = Config::load_from_path(&config_path).unwrap();
        assert_eq!(config.top, 3);
        assert_eq!(config.load, LoadConfig::default());
    }

    #[test]
    fn test_invalid_file_is_config_error() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("mdt.toml");
        std::fs::write(&config_path, "top = \"many\"\n").unwrap();

        let err = Config::load_from_path(&config_path).unwrap_err();
        assert!(matches!(err, MdtError::Config(_)));
    }

    #[test]
    fn test_load_from_nonexistent_path() {
        let result = Config::load_from_path(Path::new("/nonexistent/path/mdt.toml"));
        assert!(result.is_err());
    }

    #[test]
    fn test_flag_overrides_strip_setting() {
        let load = LoadConfig::default();
        assert!(load.to_options(true, true).strip_expensive_refs);
        assert!(!load.to_options(false, true).strip_expensive_refs);
        assert!(!load.to_options(false, false).compute_referrers);
    }
}
