//! Healthwatch - Health-Check Aggregation Exporter
//!
//! Probes a configured set of services concurrently and exposes their
//! merged health as Prometheus-style time-series metrics.

mod config;
mod metrics;
mod probe;
mod scheduler;
mod web;

use config::Config;
use scheduler::Scheduler;
use web::Server;

use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env()
            .add_directive("healthwatch=info".parse()?))
        .init();

    // Load configuration
    let cfg = Config::load()?;
    tracing::info!("Starting Healthwatch on port {}...", cfg.http_port);
    tracing::info!("Monitoring {} services", cfg.services.len());

    // One shared client; per-request timeouts come from the targets.
    let client = reqwest::Client::new();
    let scheduler = Arc::new(Scheduler::new(client, &cfg));

    // Start web server
    let server = Server::new(&cfg, scheduler);
    server.start().await?;

    Ok(())
}
