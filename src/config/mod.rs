//! Configuration module

pub mod settings;

pub use settings::{DownloadConfig, GeminiConfig, LoggingConfig, ServerConfig, Settings};
