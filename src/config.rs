//! Configuration management
//!
//! Loads pipeline configuration from TOML files and provides builders
//! for the configured processors. The remote API key itself is read
//! from the environment variable named by `api_key_env`, never stored
//! in the file.

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::processors::{
    GenerationConfig, LocalModelProcessor, ProcessorResult, RemoteModelProcessor,
};
use crate::retry::RetryPolicy;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub remote: RemoteConfig,
    pub local: LocalConfig,
    pub generation: GenerationConfig,
    pub retry: RetryConfig,
    pub output: OutputConfig,
}

/// Hosted-backend settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    pub api_key_env: String,
    pub base_url: String,
    pub model: String,
    pub timeout_ms: u64,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            api_key_env: "GEMINI_API_KEY".to_string(),
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            model: "gemini-pro".to_string(),
            timeout_ms: 60_000,
        }
    }
}

/// Local llama-server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LocalConfig {
    pub base_url: String,
    pub model_alias: String,
    pub timeout_ms: u64,
}

impl Default for LocalConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8080".to_string(),
            model_alias: "llama-2-7b-chat".to_string(),
            timeout_ms: 120_000,
        }
    }
}

/// Retry settings for transient backend failures
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub min_backoff_ms: u64,
    pub max_backoff_ms: u64,
    pub growth_factor: u32,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            min_backoff_ms: 4_000,
            max_backoff_ms: 10_000,
            growth_factor: 2,
        }
    }
}

impl RetryConfig {
    pub fn policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_attempts)
            .with_backoff(
                Duration::from_millis(self.min_backoff_ms),
                Duration::from_millis(self.max_backoff_ms),
            )
            .with_growth_factor(self.growth_factor)
    }
}

/// Output settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub output_dir: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            output_dir: "output".to_string(),
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(String),

    #[error("parse error: {0}")]
    Parse(String),
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content =
            fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::Io(e.to_string()))?;
        Self::from_toml(&content)
    }

    /// Parse configuration from a TOML string
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Load from default config locations or return defaults
    pub fn load_or_default() -> Self {
        let config_paths = ["config/concord.toml", "../config/concord.toml"];

        for path in &config_paths {
            if let Ok(config) = Self::from_file(path) {
                tracing::info!("Loaded configuration from {}", path);
                return config;
            }
        }

        tracing::info!("Using default configuration");
        Self::default()
    }

    /// Save configuration to a TOML file
    pub fn save_toml<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let content =
            toml::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))?;
        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::Io(e.to_string()))?;
        }
        fs::write(path, content).map_err(|e| ConfigError::Io(e.to_string()))?;
        Ok(())
    }

    /// Build the hosted-backend processor from this config.
    pub fn build_remote(&self) -> ProcessorResult<RemoteModelProcessor> {
        Ok(RemoteModelProcessor::from_env(&self.remote.api_key_env)?
            .with_base_url(&self.remote.base_url)
            .with_model(&self.remote.model)
            .with_generation(self.generation)
            .with_retry(self.retry.policy())
            .with_timeout_ms(self.remote.timeout_ms))
    }

    /// Build the local-backend processor from this config.
    pub fn build_local(&self) -> LocalModelProcessor {
        LocalModelProcessor::new()
            .with_base_url(&self.local.base_url)
            .with_model_alias(&self.local.model_alias)
            .with_generation(self.generation)
            .with_retry(self.retry.policy())
            .with_timeout_ms(self.local.timeout_ms)
    }
}
