//! Response normalization.
//!
//! Upstream health endpoints are not required to conform to any schema:
//! bodies arrive as `{status, details}` documents, as bare component maps,
//! as string-encoded JSON, or not at all. Everything converges here into a
//! canonical `HealthReport` so the rest of the system never inspects raw
//! shapes. Total: every input, including transport errors, produces a
//! valid report.

use super::{ComponentHealth, HealthReport, ProbeError, RawResponse};
use indexmap::IndexMap;
use serde_json::Value;

/// Normalize one transport outcome into a canonical report.
pub fn normalize(outcome: Result<RawResponse, ProbeError>) -> HealthReport {
    match outcome {
        Ok(resp) => normalize_success(resp),
        Err(err) => normalize_failure(err),
    }
}

fn normalize_success(resp: RawResponse) -> HealthReport {
    let RawResponse {
        status,
        body,
        elapsed,
    } = resp;

    let value = match serde_json::from_str(&body) {
        Ok(v) => v,
        // Unparseable bodies stay opaque strings for the decision tree.
        Err(_) => Value::String(body),
    };

    let (health_status, details) = normalize_body(value);
    HealthReport {
        status: health_status,
        details,
        request_time_ms: elapsed.as_millis() as u64,
        response_code: status,
    }
}

fn normalize_failure(err: ProbeError) -> HealthReport {
    let elapsed_ms = err.elapsed().as_millis() as u64;
    match err {
        ProbeError::UpstreamStatus { status, body, .. } => {
            reuse_error_body(&body, status).unwrap_or_else(|| synthesize_error(elapsed_ms, status))
        }
        ProbeError::Timeout { .. } | ProbeError::Network { .. } => synthesize_error(elapsed_ms, 0),
    }
}

/// Decide status and details from a response body, in fixed priority order:
/// documents declaring `status` or `details` pass through; anything else is
/// treated as an implicit component map under a synthetic "ok".
fn normalize_body(body: Value) -> (String, IndexMap<String, ComponentHealth>) {
    if let Value::Object(map) = &body {
        if map.contains_key("status") || map.contains_key("details") {
            let status = map.get("status").map(coerce_string).unwrap_or_default();
            let details = match map.get("details") {
                Some(Value::Object(entries)) => collect_details(entries),
                _ => IndexMap::new(),
            };
            return (status, details);
        }
    }

    // Implicit branch: some services answer with a bare component map,
    // occasionally double-encoded as a JSON string.
    let body = match body {
        Value::String(s) => match serde_json::from_str(&s) {
            Ok(v) => v,
            Err(_) => Value::String(s),
        },
        other => other,
    };

    let details = match &body {
        Value::Object(entries) => collect_details(entries),
        _ => IndexMap::new(),
    };

    ("ok".to_string(), details)
}

/// An error body that itself carries a `details` object is trusted as a
/// health report of its own; the transport-level status code still wins.
fn reuse_error_body(body: &str, code: u16) -> Option<HealthReport> {
    let value: Value = serde_json::from_str(body).ok()?;
    let map = value.as_object()?;
    let details = match map.get("details") {
        Some(Value::Object(entries)) => collect_details(entries),
        _ => return None,
    };

    Some(HealthReport {
        status: map.get("status").map(coerce_string).unwrap_or_default(),
        details,
        request_time_ms: map.get("requestTime").and_then(Value::as_u64).unwrap_or(0),
        response_code: code,
    })
}

fn synthesize_error(elapsed_ms: u64, code: u16) -> HealthReport {
    HealthReport {
        status: "error".to_string(),
        details: IndexMap::new(),
        request_time_ms: elapsed_ms,
        response_code: code,
    }
}

fn collect_details(entries: &serde_json::Map<String, Value>) -> IndexMap<String, ComponentHealth> {
    entries
        .iter()
        .map(|(name, value)| (name.clone(), component_from_value(value)))
        .collect()
}

/// Build a component entry from one raw detail value. Objects carrying a
/// `status` key keep their status and message; any other value becomes the
/// status verbatim.
fn component_from_value(value: &Value) -> ComponentHealth {
    if let Value::Object(map) = value {
        if let Some(status) = map.get("status") {
            return ComponentHealth {
                status: coerce_string(status),
                message: map
                    .get("message")
                    .and_then(Value::as_str)
                    .map(str::to_string),
            };
        }
    }
    ComponentHealth {
        status: coerce_string(value),
        message: None,
    }
}

fn coerce_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn ok_response(body: &str) -> RawResponse {
        RawResponse {
            status: 200,
            body: body.to_string(),
            elapsed: Duration::from_millis(10),
        }
    }

    #[test]
    fn passthrough_status_and_details() {
        let report = normalize(Ok(ok_response(
            r#"{"status":"up","details":{"db":{"status":"ok","message":"fine"}}}"#,
        )));

        assert_eq!(report.status, "up");
        assert_eq!(report.response_code, 200);
        assert_eq!(report.request_time_ms, 10);
        assert_eq!(
            report.details["db"],
            ComponentHealth {
                status: "ok".to_string(),
                message: Some("fine".to_string()),
            }
        );
    }

    #[test]
    fn status_only_gets_empty_details() {
        let report = normalize(Ok(ok_response(r#"{"status":"healthy"}"#)));

        assert_eq!(report.status, "healthy");
        assert!(report.details.is_empty());
    }

    #[test]
    fn details_only_passes_through_without_inventing_health() {
        let report = normalize(Ok(ok_response(r#"{"details":{"db":"ok"}}"#)));

        assert_eq!(report.status, "");
        assert_eq!(report.details["db"].status, "ok");
    }

    #[test]
    fn non_object_details_field_is_dropped() {
        let report = normalize(Ok(ok_response(r#"{"status":"up","details":"weird"}"#)));

        assert_eq!(report.status, "up");
        assert!(report.details.is_empty());
    }

    #[test]
    fn bare_map_becomes_implicit_details() {
        let report = normalize(Ok(ok_response(
            r#"{"db":"ok","cache":{"status":"down","message":"timeout"}}"#,
        )));

        assert_eq!(report.status, "ok");
        assert_eq!(report.details.len(), 2);
        assert_eq!(report.details["db"].status, "ok");
        assert_eq!(report.details["db"].message, None);
        assert_eq!(report.details["cache"].status, "down");
        assert_eq!(report.details["cache"].message, Some("timeout".to_string()));

        // Component order follows the upstream document.
        let names: Vec<&str> = report.details.keys().map(String::as_str).collect();
        assert_eq!(names, ["db", "cache"]);
    }

    #[test]
    fn string_encoded_json_is_reparsed() {
        let encoded = serde_json::to_string(r#"{"db":"ok"}"#).unwrap();
        let report = normalize(Ok(ok_response(&encoded)));

        assert_eq!(report.status, "ok");
        assert_eq!(report.details["db"].status, "ok");
    }

    #[test]
    fn opaque_text_body_is_synthetic_ok() {
        let report = normalize(Ok(ok_response("all systems nominal")));

        assert_eq!(report.status, "ok");
        assert!(report.details.is_empty());
    }

    #[test]
    fn non_string_component_values_are_coerced() {
        let report = normalize(Ok(ok_response(r#"{"replicas":3,"degraded":false}"#)));

        assert_eq!(report.details["replicas"].status, "3");
        assert_eq!(report.details["degraded"].status, "false");
    }

    #[test]
    fn timeout_synthesizes_error_report() {
        let report = normalize(Err(ProbeError::Timeout {
            timeout: Duration::from_millis(100),
            elapsed: Duration::from_millis(103),
        }));

        assert_eq!(report.status, "error");
        assert!(report.details.is_empty());
        assert_eq!(report.request_time_ms, 103);
        assert_eq!(report.response_code, 0);
    }

    #[test]
    fn network_error_has_response_code_zero() {
        let report = normalize(Err(ProbeError::Network {
            message: "connection refused".to_string(),
            elapsed: Duration::from_millis(2),
        }));

        assert_eq!(report.status, "error");
        assert_eq!(report.response_code, 0);
    }

    #[test]
    fn upstream_error_without_details_keeps_status_code() {
        let report = normalize(Err(ProbeError::UpstreamStatus {
            status: 503,
            body: "Service Unavailable".to_string(),
            elapsed: Duration::from_millis(7),
        }));

        assert_eq!(report.status, "error");
        assert!(report.details.is_empty());
        assert_eq!(report.request_time_ms, 7);
        assert_eq!(report.response_code, 503);
    }

    #[test]
    fn upstream_error_body_with_details_is_reused() {
        let report = normalize(Err(ProbeError::UpstreamStatus {
            status: 503,
            body: r#"{"status":"down","details":{"db":{"status":"down"}},"requestTime":42}"#
                .to_string(),
            elapsed: Duration::from_millis(7),
        }));

        assert_eq!(report.status, "down");
        assert_eq!(report.details["db"].status, "down");
        assert_eq!(report.request_time_ms, 42);
        assert_eq!(report.response_code, 503);
    }

    #[test]
    fn reused_error_body_defaults_request_time_to_zero() {
        let report = normalize(Err(ProbeError::UpstreamStatus {
            status: 500,
            body: r#"{"details":{"db":"down"}}"#.to_string(),
            elapsed: Duration::from_millis(7),
        }));

        assert_eq!(report.status, "");
        assert_eq!(report.request_time_ms, 0);
        assert_eq!(report.response_code, 500);
    }
}
