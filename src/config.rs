//! Configuration for the Colibri exporter.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    Parse(#[from] json5::Error),
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Complete exporter configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExporterConfig {
    /// Upstream videobridge statistics endpoint settings.
    #[serde(default)]
    pub colibri: ColibriConfig,

    /// Prometheus HTTP endpoint settings.
    #[serde(default)]
    pub prometheus: PrometheusConfig,

    /// Collection strategy settings.
    #[serde(default)]
    pub collection: CollectionConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Upstream statistics endpoint configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColibriConfig {
    /// Statistics URL (default: "http://127.0.0.1:8080/colibri/stats").
    #[serde(default = "default_colibri_url")]
    pub url: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Skip TLS certificate validation. Useful for self-signed certificates
    /// on internal deployments, at the cost of transport authenticity.
    #[serde(default)]
    pub insecure_skip_verify: bool,

    /// Maximum idle connections kept per host.
    #[serde(default = "default_max_idle")]
    pub max_idle_connections: usize,
}

fn default_colibri_url() -> String {
    "http://127.0.0.1:8080/colibri/stats".to_string()
}

fn default_timeout() -> u64 {
    10
}

fn default_max_idle() -> usize {
    100
}

impl Default for ColibriConfig {
    fn default() -> Self {
        Self {
            url: default_colibri_url(),
            timeout_secs: default_timeout(),
            insecure_skip_verify: false,
            max_idle_connections: default_max_idle(),
        }
    }
}

/// Prometheus HTTP endpoint configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrometheusConfig {
    /// Address to listen on (default: "0.0.0.0:9210").
    #[serde(default = "default_listen")]
    pub listen: String,

    /// Path for metrics endpoint (default: "/metrics").
    #[serde(default = "default_path")]
    pub path: String,
}

fn default_listen() -> String {
    "0.0.0.0:9210".to_string()
}

fn default_path() -> String {
    "/metrics".to_string()
}

impl Default for PrometheusConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            path: default_path(),
        }
    }
}

/// Collection strategy selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollectionMode {
    /// Background loop probes on a fixed interval; scrapes read the cached
    /// snapshot without network I/O.
    #[default]
    Cached,
    /// Every scrape probes the videobridge synchronously.
    OnDemand,
}

/// Collection strategy configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionConfig {
    /// Which collection strategy to run.
    #[serde(default)]
    pub mode: CollectionMode,

    /// Probe interval in seconds (cached mode only).
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval_secs: u64,
}

fn default_refresh_interval() -> u64 {
    30
}

impl Default for CollectionConfig {
    fn default() -> Self {
        Self {
            mode: CollectionMode::default(),
            refresh_interval_secs: default_refresh_interval(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log output format: "text" or "json".
    #[serde(default)]
    pub format: LogFormat,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl ExporterConfig {
    /// Load configuration from a JSON5 file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: ExporterConfig = json5::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from a JSON5 string.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: ExporterConfig = json5::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.colibri.url.is_empty() {
            return Err(ConfigError::Validation(
                "colibri.url must not be empty".to_string(),
            ));
        }

        if !self.colibri.url.starts_with("http://") && !self.colibri.url.starts_with("https://") {
            return Err(ConfigError::Validation(format!(
                "colibri.url must be an http(s) URL: {}",
                self.colibri.url
            )));
        }

        if self.colibri.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "timeout_secs must be > 0".to_string(),
            ));
        }

        if self.collection.refresh_interval_secs == 0 {
            return Err(ConfigError::Validation(
                "refresh_interval_secs must be > 0".to_string(),
            ));
        }

        // Validate listen address format
        if self
            .prometheus
            .listen
            .parse::<std::net::SocketAddr>()
            .is_err()
        {
            return Err(ConfigError::Validation(format!(
                "Invalid listen address: {}",
                self.prometheus.listen
            )));
        }

        // Validate path starts with /
        if !self.prometheus.path.starts_with('/') {
            return Err(ConfigError::Validation(
                "Metrics path must start with /".to_string(),
            ));
        }

        Ok(())
    }
}

impl Default for ExporterConfig {
    fn default() -> Self {
        Self {
            colibri: ColibriConfig::default(),
            prometheus: PrometheusConfig::default(),
            collection: CollectionConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}
