//! Configuration loading and management for notecast.
//!
//! Loads settings from `notecast.toml` with environment variable overrides for sensitive data.
//! Every section has defaults, so running without a config file is fine.

use crate::chunker::DEFAULT_CHUNK_CHARS;
use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("missing required API key for provider: {0}")]
    MissingApiKey(String),
    #[error("unknown model provider: {0}")]
    UnknownProvider(String),
    #[error("min_length ({min}) must not exceed max_length ({max})")]
    InvalidLengthBounds { min: u32, max: u32 },
}

/// Summarization model configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Model provider: "huggingface" or "gemini"
    pub provider: String,
    /// Model identifier (e.g., "facebook/bart-large-cnn" or "gemini-2.0-flash")
    pub name: String,
    /// Base URL of the Hugging Face inference endpoint
    pub endpoint: String,
}

/// Chunking and summary length settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SummaryConfig {
    /// Maximum number of characters sent to the model in one call
    pub chunk_chars: NonZeroUsize,
    /// Upper bound on the length of each chunk summary (advisory)
    pub max_length: u32,
    /// Lower bound on the length of each chunk summary (advisory)
    pub min_length: u32,
}

/// Speech synthesis settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NarrationConfig {
    /// IETF language tag passed to the speech engine
    pub language: String,
    /// Top-level domain of the Google Translate host, e.g. "com" or "co.uk"
    pub tld: String,
    /// Read more slowly
    pub slow: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadConfig {
    /// Largest PDF accepted, in bytes
    pub max_bytes: usize,
}

/// API keys configuration (loaded from environment)
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ApiConfig {
    #[serde(default)]
    pub hf_token: Option<String>,
    #[serde(default)]
    pub gemini_key: Option<String>,
}

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub summary: SummaryConfig,
    #[serde(default)]
    pub narration: NarrationConfig,
    #[serde(default)]
    pub upload: UploadConfig,
    #[serde(default)]
    pub api: ApiConfig,
}

impl Config {
    /// Load configuration from the default location (notecast.toml in cwd or home).
    /// Falls back to the built-in defaults when no file exists.
    pub fn load() -> Result<Self, ConfigError> {
        match Self::find_config_file() {
            Some(path) => Self::load_from(&path),
            None => {
                tracing::debug!("No config file found, using defaults");
                let mut config = Config::default();
                config.apply_env();
                Ok(config)
            }
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config = Self::parse(&content)?;
        config.apply_env();
        tracing::debug!(path = %path.display(), "Loaded config");
        Ok(config)
    }

    /// Parse and validate a TOML document without touching the environment
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.summary.min_length > self.summary.max_length {
            return Err(ConfigError::InvalidLengthBounds {
                min: self.summary.min_length,
                max: self.summary.max_length,
            });
        }
        match self.model.provider.as_str() {
            "huggingface" | "gemini" => Ok(()),
            other => Err(ConfigError::UnknownProvider(other.to_string())),
        }
    }

    // Override API keys from environment variables
    fn apply_env(&mut self) {
        if let Ok(key) = std::env::var("HF_API_TOKEN") {
            self.api.hf_token = Some(key);
        }
        if let Ok(key) = std::env::var("GEMINI_API_KEY") {
            self.api.gemini_key = Some(key);
        }
    }

    /// Find the config file in standard locations
    fn find_config_file() -> Option<PathBuf> {
        let local_config = PathBuf::from("notecast.toml");
        if local_config.exists() {
            return Some(local_config);
        }

        dirs::home_dir()
            .map(|home| home.join(".config").join("notecast").join("notecast.toml"))
            .filter(|path| path.exists())
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            provider: "huggingface".to_string(),
            name: "facebook/bart-large-cnn".to_string(),
            endpoint: "https://router.huggingface.co/hf-inference/models".to_string(),
        }
    }
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            chunk_chars: DEFAULT_CHUNK_CHARS,
            max_length: 150,
            min_length: 30,
        }
    }
}

impl Default for NarrationConfig {
    fn default() -> Self {
        Self {
            language: "en".to_string(),
            tld: "com".to_string(),
            slow: false,
        }
    }
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_bytes: 50 * 1024 * 1024,
        }
    }
}
