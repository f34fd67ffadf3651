//! Configuration file handling for csiweb

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for the CLI tool
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Default logger address (`host[:port]`)
    pub address: Option<String>,
    /// Default table list; discovery is used when absent
    pub tables: Option<Vec<String>>,
    /// Account for authenticated loggers
    pub username: Option<String>,
    /// Disable colored output
    pub no_color: Option<bool>,
}

impl Config {
    /// Load configuration from the default config file
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;
        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path).with_context(|| {
                format!("Failed to read config file: {}", config_path.display())
            })?;
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {}", config_path.display()))
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &PathBuf) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Get the default config file path
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Could not determine config directory")?
            .join("csiweb");

        Ok(config_dir.join("config.toml"))
    }

    /// Merge CLI arguments over config file values
    pub fn merge_with_args(
        &self,
        address: Option<&str>,
        tables: Option<Vec<String>>,
        username: Option<&str>,
        no_color: bool,
    ) -> Result<MergedConfig> {
        let address = address
            .map(String::from)
            .or_else(|| self.address.clone())
            .context("No logger address given (use --address or the config file)")?;

        Ok(MergedConfig {
            address,
            tables: tables.or_else(|| self.tables.clone()),
            username: username.map(String::from).or_else(|| self.username.clone()),
            no_color: no_color || self.no_color.unwrap_or(false),
        })
    }
}

/// Fully resolved configuration after merging CLI args
#[derive(Debug, Clone)]
pub struct MergedConfig {
    pub address: String,
    /// `None` means "discover from the device"
    pub tables: Option<Vec<String>>,
    pub username: Option<String>,
    pub no_color: bool,
}
