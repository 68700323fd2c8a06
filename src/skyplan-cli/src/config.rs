//! Configuration management for skyplan CLI

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Reference data used when nothing is configured
pub const DEFAULT_DATA: &str = "share/data";

#[derive(Debug, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Config {
    /// Reference data directory or http(s) base URL
    pub data: Option<String>,
    /// Planner base URL for encoded links
    pub base_url: Option<String>,
}

impl Config {
    /// Get the path to the config file
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Could not determine config directory")?
            .join("skyplan");

        Ok(config_dir.join("config.toml"))
    }

    /// Load configuration from file, or default if it doesn't exist
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            return Ok(Config::default());
        }

        let contents = fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config from {}", config_path.display()))?;

        toml::from_str(&contents).context("Failed to parse config file")
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        // Create config directory if it doesn't exist
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory at {}", parent.display())
            })?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(config_path, contents)
            .with_context(|| format!("Failed to write config to {}", config_path.display()))?;

        Ok(())
    }

    /// Reference data location: explicit override, then config, then [`DEFAULT_DATA`]
    pub fn data_or<'a>(&'a self, explicit: Option<&'a str>) -> &'a str {
        explicit
            .or(self.data.as_deref())
            .unwrap_or(DEFAULT_DATA)
    }

    /// Planner base URL: explicit override, then config, then the library default
    pub fn base_url_or<'a>(&'a self, explicit: Option<&'a str>) -> &'a str {
        explicit
            .or(self.base_url.as_deref())
            .unwrap_or(skyplan::DEFAULT_BASE_URL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_is_default() {
        let dir = TempDir::new().unwrap();
        let config = Config::load_from(&dir.path().join("config.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let config = Config {
            data: Some("https://data.example/skyrim".to_string()),
            base_url: None,
        };
        config.save_to(&path).unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        assert!(contents.contains("data = \"https://data.example/skyrim\""));
        assert_eq!(Config::load_from(&path).unwrap(), config);
    }

    #[test]
    fn test_invalid_toml() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "data = [").unwrap();
        assert!(Config::load_from(&path).is_err());
    }

    #[test]
    fn test_precedence() {
        let config = Config {
            data: Some("/srv/skyplan".to_string()),
            base_url: None,
        };
        assert_eq!(config.data_or(Some("./data")), "./data");
        assert_eq!(config.data_or(None), "/srv/skyplan");
        assert_eq!(Config::default().data_or(None), DEFAULT_DATA);
        assert_eq!(config.base_url_or(None), skyplan::DEFAULT_BASE_URL);
        assert_eq!(
            config.base_url_or(Some("http://localhost/")),
            "http://localhost/"
        );
    }

    #[test]
    fn test_config_path() {
        if let Ok(path) = Config::config_path() {
            assert!(path.ends_with("skyplan/config.toml"));
        }
    }
}
