//! Configuration management for Concierge
//!
//! This module handles loading, parsing, and validating configuration
//! from YAML files, with sensible defaults for local development.

use crate::error::{ConciergeError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure for Concierge
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Transport configuration for the assistant backend
    #[serde(default)]
    pub transport: TransportConfig,
}

/// Assistant backend transport configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransportConfig {
    /// Base URL of the assistant backend
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Config {
    /// Load configuration from a YAML file
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the YAML configuration file
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read or parsed
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            ConciergeError::Config(format!(
                "Failed to read {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;
        let config: Config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns error if the base URL is not a valid absolute URL or the
    /// timeout is zero
    pub fn validate(&self) -> Result<()> {
        url::Url::parse(&self.transport.base_url).map_err(|e| {
            ConciergeError::Config(format!(
                "Invalid transport base_url '{}': {}",
                self.transport.base_url, e
            ))
        })?;

        if self.transport.timeout_secs == 0 {
            return Err(
                ConciergeError::Config("transport timeout_secs must be non-zero".to_string())
                    .into(),
            );
        }

        Ok(())
    }
}
