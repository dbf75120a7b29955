//! Application settings and configuration management

use crate::error::{AppError, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Environment variable carrying the model API credential
pub const API_KEY_ENV: &str = "API_KEY";

/// Root configuration structure
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    pub server: ServerConfig,
    pub gemini: GeminiConfig,
    pub download: DownloadConfig,
    pub logging: LoggingConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
    /// Directory of view assets served at `/`
    #[serde(default)]
    pub static_dir: Option<String>,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_max_upload_bytes() -> usize {
    20 * 1024 * 1024
}

/// Remote generation endpoint configuration
#[derive(Clone, Deserialize, Serialize)]
pub struct GeminiConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_timeout")]
    pub timeout_ms: u64,
}

// Keeps the credential out of logs.
impl std::fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("api_key", &if self.api_key.is_empty() { "<unset>" } else { "<redacted>" })
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("timeout_ms", &self.timeout_ms)
            .finish()
    }
}

fn default_base_url() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

fn default_model() -> String {
    "gemini-2.5-flash-image".to_string()
}

fn default_timeout() -> u64 {
    120000
}

/// Download configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DownloadConfig {
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
}

fn default_output_dir() -> String {
    ".".to_string()
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "json".to_string()
}

impl Settings {
    /// Load settings from configuration files and environment variables
    pub fn load() -> Result<Self> {
        Self::load_from_path("config/default.toml")
    }

    /// Load settings from a specific configuration file path
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut builder = Config::builder()
            // Start with default values
            .set_default("server.host", default_host())?
            .set_default("server.port", default_port() as i64)?
            .set_default("server.max_upload_bytes", default_max_upload_bytes() as i64)?
            .set_default("gemini.api_key", "")?
            .set_default("gemini.base_url", default_base_url())?
            .set_default("gemini.model", default_model())?
            .set_default("gemini.timeout_ms", default_timeout() as i64)?
            .set_default("download.output_dir", default_output_dir())?
            .set_default("logging.level", default_log_level())?
            .set_default("logging.format", default_log_format())?
            // Load from configuration file
            .add_source(File::with_name(path.as_ref().to_str().unwrap_or("config/default")).required(false))
            // Override with environment variables (ANIME_PORTRAIT_<SECTION>__<KEY>)
            .add_source(
                Environment::with_prefix("ANIME_PORTRAIT")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            );

        if let Ok(key) = std::env::var(API_KEY_ENV) {
            builder = builder.set_override("gemini.api_key", key)?;
        }

        let settings: Settings = builder.build()?.try_deserialize()?;
        Ok(settings)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(AppError::Config(config::ConfigError::Message(
                "Server port cannot be 0".to_string(),
            )));
        }

        if self.gemini.api_key.trim().is_empty() {
            return Err(AppError::Config(config::ConfigError::Message(format!(
                "{} is not set; the generation endpoint requires a credential",
                API_KEY_ENV
            ))));
        }

        if self.gemini.model.is_empty() {
            return Err(AppError::Config(config::ConfigError::Message(
                "Model name cannot be empty".to_string(),
            )));
        }

        if !["json", "pretty"].contains(&self.logging.format.as_str()) {
            return Err(AppError::Config(config::ConfigError::Message(format!(
                "Invalid log format '{}'. Must be 'json' or 'pretty'",
                self.logging.format
            ))));
        }

        Ok(())
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: default_host(),
                port: default_port(),
                max_upload_bytes: default_max_upload_bytes(),
                static_dir: None,
            },
            gemini: GeminiConfig {
                api_key: String::new(),
                base_url: default_base_url(),
                model: default_model(),
                timeout_ms: default_timeout(),
            },
            download: DownloadConfig {
                output_dir: default_output_dir(),
            },
            logging: LoggingConfig {
                level: default_log_level(),
                format: default_log_format(),
            },
        }
    }
}
