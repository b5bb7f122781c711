//! Service configuration

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::PathBuf;

/// Service configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    /// Interface to bind
    #[serde(default = "default_host")]
    pub host: String,

    /// HTTP port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Fitted pipeline artifact served by `/predict`
    #[serde(default = "default_pipeline_path")]
    pub pipeline_path: PathBuf,

    /// Load the pipeline at startup instead of on the first request
    #[serde(default)]
    pub eager_load: bool,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8001
}

fn default_pipeline_path() -> PathBuf {
    PathBuf::from("models/pipeline__v0.0.1.bin")
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            pipeline_path: default_pipeline_path(),
            eager_load: false,
        }
    }
}

impl ServiceConfig {
    /// Load configuration from an optional `service.toml` and `AGE_SERVICE_*` variables
    pub fn load() -> Result<Self> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("service").required(false))
            .add_source(config::Environment::with_prefix("AGE_SERVICE").try_parsing(true))
            .build()
            .context("Failed to read service configuration")?;

        config
            .try_deserialize()
            .context("Invalid service configuration")
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ServiceConfig::default();
        assert_eq!(config.port, 8001);
        assert_eq!(config.bind_addr(), "0.0.0.0:8001");
        assert_eq!(
            config.pipeline_path,
            PathBuf::from("models/pipeline__v0.0.1.bin")
        );
        assert!(!config.eager_load);
    }

    #[test]
    fn test_empty_sources_fall_back_to_defaults() {
        let config: ServiceConfig = config::Config::builder()
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();
        assert_eq!(config.port, 8001);
        assert_eq!(config.host, "0.0.0.0");
    }
}
