//! Probe module for health-check fan-out.
//!
//! One probe is a single HTTP GET against a service's health endpoint,
//! normalized into a canonical `HealthReport` no matter what the upstream
//! returned (or failed to return).

mod http;
mod normalize;

pub use http::*;
pub use normalize::*;

use indexmap::IndexMap;
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;

/// Probe error types.
#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("probe timed out after {timeout:?}")]
    Timeout { timeout: Duration, elapsed: Duration },
    #[error("network error: {message}")]
    Network { message: String, elapsed: Duration },
    #[error("upstream returned HTTP {status}")]
    UpstreamStatus {
        status: u16,
        body: String,
        elapsed: Duration,
    },
}

impl ProbeError {
    /// Wall-clock time spent before the probe failed.
    pub fn elapsed(&self) -> Duration {
        match self {
            ProbeError::Timeout { elapsed, .. }
            | ProbeError::Network { elapsed, .. }
            | ProbeError::UpstreamStatus { elapsed, .. } => *elapsed,
        }
    }
}

/// Canonical outcome of probing one service.
///
/// `status` and `details` are always present after normalization; `details`
/// iterates in the order the upstream document listed its components.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthReport {
    pub status: String,
    pub details: IndexMap<String, ComponentHealth>,
    pub request_time_ms: u64,
    /// HTTP status if the transport reached the server, 0 otherwise.
    pub response_code: u16,
}

/// Health of one sub-component reported by a service.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComponentHealth {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Probe one service and normalize whatever happened into a report.
///
/// Never fails: transport errors come back as `status = "error"` reports.
pub async fn check_service(
    client: &reqwest::Client,
    name: &str,
    url: &str,
    timeout: Duration,
) -> HealthReport {
    tracing::info!("Requesting {}: {}", name, url);

    let outcome = fetch_health(client, url, timeout).await;
    if let Err(e) = &outcome {
        tracing::error!("Probe failed for {}: {}", name, e);
    }

    let report = normalize(outcome);
    tracing::info!(
        "Done.. {} status: {}, time taken: {} ms",
        name,
        report.status,
        report.request_time_ms
    );
    report
}
