//! Aggregation scheduler: concurrent probe fan-out under a global deadline.

use crate::config::{Config, ServiceTarget};
use crate::probe::{check_service, HealthReport};

use serde::Serialize;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::Instant;

/// One service's entry in an aggregation report.
#[derive(Debug, Clone, Serialize)]
pub struct ServiceReport {
    pub name: String,
    #[serde(flatten)]
    pub health: HealthReport,
}

/// Orchestrates one aggregation run across all configured targets.
///
/// Each run probes every target concurrently and waits for the results on
/// a single channel, racing completion against the run deadline. Targets
/// never block or cancel each other.
pub struct Scheduler {
    client: reqwest::Client,
    services: Vec<ServiceTarget>,
    default_timeout: Duration,
    max_execution: Duration,
}

impl Scheduler {
    /// Create a scheduler from the loaded configuration.
    pub fn new(client: reqwest::Client, config: &Config) -> Self {
        Self {
            client,
            services: config.services.clone(),
            default_timeout: config.ping_default_timeout,
            max_execution: config.max_execution_timeout,
        }
    }

    /// Run one aggregation and return whatever completed before the
    /// deadline, in declared target order. A deadline expiry is not an
    /// error, only a partial result.
    pub async fn run(&self) -> Vec<ServiceReport> {
        let started = Instant::now();
        if self.services.is_empty() {
            return Vec::new();
        }

        tracing::info!("Starting health check of {} services..", self.services.len());

        let (tx, mut rx) = mpsc::channel(self.services.len());
        for (index, service) in self.services.iter().enumerate() {
            let client = self.client.clone();
            let tx = tx.clone();
            let name = service.name.clone();
            let url = service.url.clone();
            let timeout = service
                .timeout
                .map(Duration::from_millis)
                .unwrap_or(self.default_timeout);

            tokio::spawn(async move {
                let report = check_service(&client, &name, &url, timeout).await;
                // The receiver is gone once the deadline fires; late
                // results are simply dropped.
                let _ = tx.send((index, report)).await;
            });
        }
        drop(tx);

        let deadline = started + self.max_execution;
        let mut completed: Vec<Option<HealthReport>> = vec![None; self.services.len()];
        let mut finished = 0usize;

        loop {
            tokio::select! {
                received = rx.recv() => match received {
                    Some((index, report)) => {
                        completed[index] = Some(report);
                        finished += 1;
                        if finished == self.services.len() {
                            break;
                        }
                    }
                    None => break,
                },
                _ = tokio::time::sleep_until(deadline) => {
                    tracing::warn!(
                        "Deadline reached with {}/{} services finished",
                        finished,
                        self.services.len()
                    );
                    break;
                }
            }
        }

        tracing::info!(
            "Finished!! ({}/{} finished in {:.2} seconds)",
            finished,
            self.services.len(),
            started.elapsed().as_secs_f64()
        );

        self.services
            .iter()
            .zip(completed)
            .filter_map(|(service, report)| {
                report.map(|health| ServiceReport {
                    name: service.name.clone(),
                    health,
                })
            })
            .collect()
    }
}
