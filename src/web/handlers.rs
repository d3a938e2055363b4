//! HTTP request handlers.

use super::AppState;

use axum::extract::State;
use axum::http::header;
use axum::response::{IntoResponse, Json};

/// Prometheus text exposition content type.
const METRICS_CONTENT_TYPE: &str = "text/plain; version=0.0.4";

/// `GET /metrics`: run one aggregation and return the exposition text.
pub async fn handle_metrics(State(state): State<AppState>) -> impl IntoResponse {
    let report = state.scheduler.run().await;
    let lines = state.renderer.render(&report);

    let mut body = lines.join("\n");
    if !body.is_empty() {
        body.push('\n');
    }

    ([(header::CONTENT_TYPE, METRICS_CONTENT_TYPE)], body)
}

/// `GET /api/report`: the same snapshot as structured per-service JSON.
pub async fn handle_report(State(state): State<AppState>) -> impl IntoResponse {
    let report = state.scheduler.run().await;
    Json(report)
}
