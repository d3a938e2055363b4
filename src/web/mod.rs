//! Web server module.

mod handlers;

pub use handlers::*;

use crate::config::Config;
use crate::metrics::MetricsRenderer;
use crate::scheduler::Scheduler;

use axum::{routing::get, Router};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub scheduler: Arc<Scheduler>,
    pub renderer: Arc<MetricsRenderer>,
}

/// Web server for Healthwatch.
pub struct Server {
    port: u16,
    state: AppState,
}

impl Server {
    /// Create a new server with the given dependencies.
    pub fn new(config: &Config, scheduler: Arc<Scheduler>) -> Self {
        Self {
            port: config.http_port,
            state: AppState {
                scheduler,
                renderer: Arc::new(MetricsRenderer::default()),
            },
        }
    }

    /// Build the router with all routes.
    fn routes(&self) -> Router {
        let cors = CorsLayer::new().allow_origin(Any).allow_methods(Any);

        Router::new()
            .route("/metrics", get(handlers::handle_metrics))
            .route("/api/report", get(handlers::handle_report))
            .layer(cors)
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    /// Start the server on the configured port.
    pub async fn start(&self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let addr = SocketAddr::from(([0, 0, 0, 0], self.port));
        let router = self.routes();

        tracing::info!("Web server listening on {}", addr);

        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, router).await?;

        Ok(())
    }
}
