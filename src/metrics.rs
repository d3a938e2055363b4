//! Time-series rendering of aggregated health reports.

use crate::scheduler::ServiceReport;
use chrono::Utc;

/// Status strings that count as healthy. Compared case-sensitively.
pub const DEFAULT_UP_STATUSES: &[&str] = &["ok", "OK", "Ok", "working", "up", "UP", "healthy"];

/// Renders reports into Prometheus-style exposition lines.
pub struct MetricsRenderer {
    up_statuses: Vec<String>,
}

impl Default for MetricsRenderer {
    fn default() -> Self {
        Self {
            up_statuses: DEFAULT_UP_STATUSES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl MetricsRenderer {
    /// Render a report, stamping every line with the current time.
    pub fn render(&self, report: &[ServiceReport]) -> Vec<String> {
        self.render_at(report, Utc::now().timestamp_millis())
    }

    /// Render with a fixed timestamp.
    ///
    /// Emits exactly `3 + |details|` lines per service, in report order.
    /// Label values are embedded literally, without escaping.
    pub fn render_at(&self, report: &[ServiceReport], timestamp_ms: i64) -> Vec<String> {
        let mut lines = Vec::with_capacity(report.len() * 4);

        for entry in report {
            let health = &entry.health;
            lines.push(format!(
                "health_check_response_status{{service=\"{}\"}} {} {}",
                entry.name,
                self.health_bit(&health.status),
                timestamp_ms
            ));
            lines.push(format!(
                "health_check_response_time{{service=\"{}\"}} {} {}",
                entry.name, health.request_time_ms, timestamp_ms
            ));
            lines.push(format!(
                "health_check_response_code{{service=\"{}\"}} {} {}",
                entry.name, health.response_code, timestamp_ms
            ));

            for (component, detail) in &health.details {
                lines.push(format!(
                    "health_check_component_status{{service=\"{}\",component=\"{}\",message=\"{}\"}} {} {}",
                    entry.name,
                    component,
                    detail.message.as_deref().unwrap_or(""),
                    self.health_bit(&detail.status),
                    timestamp_ms
                ));
            }
        }

        lines
    }

    fn health_bit(&self, status: &str) -> u8 {
        if self.up_statuses.iter().any(|s| s == status) {
            1
        } else {
            0
        }
    }
}
