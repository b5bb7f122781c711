//! Configuration management for the CLI

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_API_URL: &str = "http://localhost:8001";
pub const DEFAULT_OUT_DIR: &str = "models";
pub const DEFAULT_VERSION: &str = "v0.0.1";

/// CLI configuration stored in `~/.config/abalone/config.json`
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    /// Prediction service URL
    pub api_url: Option<String>,
    /// Artifact directory for training runs
    pub out_dir: Option<PathBuf>,
    /// Artifact version for training runs
    pub version: Option<String>,
}

impl Config {
    /// Load configuration from the user config file, if there is one
    pub fn load() -> Result<Self> {
        match Self::config_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).context("Failed to read config file")?;

        serde_json::from_str(&content).context("Failed to parse config file")
    }

    /// Get the configuration file path
    fn config_path() -> Option<PathBuf> {
        dirs_next::home_dir().map(|home| home.join(".config").join("abalone").join("config.json"))
    }

    /// Command-line value, then config file, then built-in default
    pub fn api_url(&self, flag: Option<String>) -> String {
        flag.or_else(|| self.api_url.clone())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string())
    }

    pub fn out_dir(&self, flag: Option<PathBuf>) -> PathBuf {
        flag.or_else(|| self.out_dir.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUT_DIR))
    }

    pub fn version(&self, flag: Option<String>) -> String {
        flag.or_else(|| self.version.clone())
            .unwrap_or_else(|| DEFAULT_VERSION.to_string())
    }
}
