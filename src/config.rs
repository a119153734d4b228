//! Configuration loading and validation.

use serde::Deserialize;
use std::net::SocketAddr;
use std::path::Path;
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Listener settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// TLS material. Mandatory; the server refuses to speak plaintext.
    pub tls: TlsConfig,
    /// Database settings.
    #[serde(default)]
    pub database: DatabaseConfig,
}

/// Listener settings.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Address the gateway binds to.
    #[serde(default = "default_listen")]
    pub listen: SocketAddr,
    /// Log output format.
    #[serde(default)]
    pub log_format: LogFormat,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            log_format: LogFormat::default(),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    #[default]
    Pretty,
}

/// TLS material, PEM-encoded, loaded at startup.
#[derive(Debug, Clone, Deserialize)]
pub struct TlsConfig {
    pub cert_path: String,
    pub key_path: String,
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_db_path")]
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

fn default_listen() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 12345))
}

fn default_db_path() -> String {
    "chatter.db".to_string()
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }
}

/// Validate the configuration, collecting every problem before boot aborts.
pub fn validate(config: &Config) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    if config.tls.cert_path.is_empty() {
        errors.push("tls.cert_path must not be empty".to_string());
    }
    if config.tls.key_path.is_empty() {
        errors.push("tls.key_path must not be empty".to_string());
    }
    if config.database.path.is_empty() {
        errors.push("database.path must not be empty".to_string());
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}
