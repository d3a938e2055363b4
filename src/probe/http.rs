//! HTTP transport for health probes.

use super::ProbeError;
use std::time::{Duration, Instant};

/// A successful (2xx) exchange with a health endpoint.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
    pub elapsed: Duration,
}

/// Issue a single GET against a health endpoint.
///
/// A 2xx answer yields the raw body; any other status is an
/// `UpstreamStatus` error carrying whatever the upstream sent back.
/// Exactly one attempt is made, no retries.
pub async fn fetch_health(
    client: &reqwest::Client,
    url: &str,
    timeout: Duration,
) -> Result<RawResponse, ProbeError> {
    let start = Instant::now();

    let response = client
        .get(url)
        .timeout(timeout)
        .send()
        .await
        .map_err(|e| classify(e, timeout, start.elapsed()))?;

    let status = response.status();

    // Read the full body; error payloads matter too, they may carry
    // component details the normalizer can reuse.
    let body = response
        .text()
        .await
        .map_err(|e| classify(e, timeout, start.elapsed()))?;

    let elapsed = start.elapsed();

    if status.is_success() {
        Ok(RawResponse {
            status: status.as_u16(),
            body,
            elapsed,
        })
    } else {
        Err(ProbeError::UpstreamStatus {
            status: status.as_u16(),
            body,
            elapsed,
        })
    }
}

fn classify(e: reqwest::Error, timeout: Duration, elapsed: Duration) -> ProbeError {
    if e.is_timeout() {
        ProbeError::Timeout { timeout, elapsed }
    } else {
        ProbeError::Network {
            message: e.to_string(),
            elapsed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn fetch_health_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/health"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "ok"})))
            .mount(&server)
            .await;

        let client = reqwest::Client::new();
        let url = format!("{}/health", server.uri());
        let resp = fetch_health(&client, &url, Duration::from_secs(5))
            .await
            .unwrap();

        assert_eq!(resp.status, 200);
        assert!(resp.body.contains("ok"));
    }

    #[tokio::test]
    async fn fetch_health_upstream_error_carries_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/health"))
            .respond_with(ResponseTemplate::new(503).set_body_string("service down"))
            .mount(&server)
            .await;

        let client = reqwest::Client::new();
        let url = format!("{}/health", server.uri());
        let err = fetch_health(&client, &url, Duration::from_secs(5))
            .await
            .unwrap_err();

        match err {
            ProbeError::UpstreamStatus { status, body, .. } => {
                assert_eq!(status, 503);
                assert_eq!(body, "service down");
            }
            other => panic!("expected UpstreamStatus, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn fetch_health_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/health"))
            .respond_with(
                ResponseTemplate::new(200).set_delay(Duration::from_millis(500)),
            )
            .mount(&server)
            .await;

        let client = reqwest::Client::new();
        let url = format!("{}/health", server.uri());
        let err = fetch_health(&client, &url, Duration::from_millis(50))
            .await
            .unwrap_err();

        assert!(matches!(err, ProbeError::Timeout { .. }));
    }

    #[tokio::test]
    async fn fetch_health_connection_refused() {
        let client = reqwest::Client::new();
        let err = fetch_health(&client, "http://127.0.0.1:1/health", Duration::from_secs(1))
            .await
            .unwrap_err();

        assert!(matches!(err, ProbeError::Network { .. }));
    }
}
