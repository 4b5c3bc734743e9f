//! services/assistant/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use std::time::Duration;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub log_level: Level,
    /// Simulated latency of summary generation.
    pub summary_latency: Duration,
    /// Simulated latency of answering a chat message.
    pub response_latency: Duration,
    /// Extension hint offered to the file picker, e.g. `.pdf`. Advisory only.
    pub accepted_extensions: Vec<String>,
    /// Per-file size hint. Advisory only.
    pub max_file_size_bytes: u64,
}

const DEFAULT_ACCEPTED_EXTENSIONS: &str = ".pdf,.txt,.doc,.docx";

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: Level::INFO,
            summary_latency: Duration::from_millis(2500),
            response_latency: Duration::from_millis(1500),
            accepted_extensions: parse_extensions(DEFAULT_ACCEPTED_EXTENSIONS),
            max_file_size_bytes: 10 * 1024 * 1024,
        }
    }
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }
        let defaults = Self::default();

        let log_level_str = std::env::var("RUST_LOG").unwrap_or_else(|_| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        // --- Simulated Latencies ---
        let summary_latency = parse_millis(
            "SUMMARY_LATENCY_MS",
            std::env::var("SUMMARY_LATENCY_MS").ok(),
            defaults.summary_latency,
        )?;
        let response_latency = parse_millis(
            "RESPONSE_LATENCY_MS",
            std::env::var("RESPONSE_LATENCY_MS").ok(),
            defaults.response_latency,
        )?;

        // --- File Selection Hints ---
        let accepted_extensions = std::env::var("ACCEPTED_EXTENSIONS")
            .map(|v| parse_extensions(&v))
            .unwrap_or(defaults.accepted_extensions);

        let max_file_size_bytes = parse_megabytes(
            "MAX_FILE_SIZE_MB",
            std::env::var("MAX_FILE_SIZE_MB").ok(),
            defaults.max_file_size_bytes,
        )?;

        Ok(Self {
            log_level,
            summary_latency,
            response_latency,
            accepted_extensions,
            max_file_size_bytes,
        })
    }
}

fn parse_millis(
    name: &str,
    raw: Option<String>,
    default: Duration,
) -> Result<Duration, ConfigError> {
    match raw {
        Some(value) => value
            .trim()
            .parse::<u64>()
            .map(Duration::from_millis)
            .map_err(|e| ConfigError::InvalidValue(name.to_string(), e.to_string())),
        None => Ok(default),
    }
}

/// Parses a whole number of megabytes into bytes.
fn parse_megabytes(name: &str, raw: Option<String>, default: u64) -> Result<u64, ConfigError> {
    let Some(value) = raw else {
        return Ok(default);
    };
    let megabytes = value
        .trim()
        .parse::<u64>()
        .map_err(|e| ConfigError::InvalidValue(name.to_string(), e.to_string()))?;
    megabytes.checked_mul(1024 * 1024).ok_or_else(|| {
        ConfigError::InvalidValue(name.to_string(), format!("{} MB does not fit in bytes", megabytes))
    })
}

/// Splits a comma separated list into normalized `.ext` entries.
fn parse_extensions(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|ext| ext.trim().to_lowercase())
        .filter(|ext| !ext.is_empty())
        .map(|ext| {
            if ext.starts_with('.') {
                ext
            } else {
                format!(".{}", ext)
            }
        })
        .collect()
}
