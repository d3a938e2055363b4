//! Configuration module for Healthwatch.
//!
//! Loaded once at startup from environment variables; malformed input is
//! fatal before any probing begins.

use serde::Deserialize;
use std::env;
use std::time::Duration;
use thiserror::Error;

/// One upstream service to probe.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceTarget {
    pub name: String,
    pub url: String,
    /// Per-service probe timeout in milliseconds, overriding the default.
    #[serde(default)]
    pub timeout: Option<u64>,
}

/// Configuration error types.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("SERVICES is not set")]
    MissingServices,
    #[error("SERVICES is not a valid JSON array of targets: {0}")]
    InvalidServices(#[from] serde_json::Error),
    #[error("invalid value for {name}: {value:?}")]
    InvalidNumber { name: &'static str, value: String },
}

/// Exporter configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP port for the metrics endpoint (default: 8080)
    pub http_port: u16,
    /// Services to probe, in report order.
    pub services: Vec<ServiceTarget>,
    /// Default per-probe timeout when a service does not set one.
    pub ping_default_timeout: Duration,
    /// Global deadline for one aggregation run.
    pub max_execution_timeout: Duration,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `SERVICES`: JSON array of `{name, url, timeout?}` (required)
    /// - `SERVICE_PING_DEFAULT_TIMEOUT`: default probe timeout in ms (default: 5000)
    /// - `MAX_EXECUTION_TIMEOUT`: run deadline in seconds (default: 10)
    /// - `HEALTHWATCH_HTTP_PORT`: HTTP port (default: 8080)
    pub fn load() -> Result<Self, ConfigError> {
        let raw = env::var("SERVICES").map_err(|_| ConfigError::MissingServices)?;
        let services = parse_services(&raw)?;

        Ok(Self {
            http_port: env_number("HEALTHWATCH_HTTP_PORT", 8080)?,
            services,
            ping_default_timeout: Duration::from_millis(env_number(
                "SERVICE_PING_DEFAULT_TIMEOUT",
                5000,
            )?),
            max_execution_timeout: Duration::from_secs(env_number("MAX_EXECUTION_TIMEOUT", 10)?),
        })
    }
}

/// Parse the `SERVICES` JSON array.
pub fn parse_services(raw: &str) -> Result<Vec<ServiceTarget>, ConfigError> {
    Ok(serde_json::from_str(raw)?)
}

fn env_number<T: std::str::FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidNumber { name, value }),
        Err(_) => Ok(default),
    }
}
