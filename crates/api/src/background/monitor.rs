//! Scheduled monitoring cycles.
//!
//! Runs one alert cycle per interval for the configured server until
//! cancelled. A failed cycle is logged and the loop keeps going.

use std::sync::Arc;

use hostwatch_pipeline::{CycleRequest, Pipeline};
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::config::MonitorConfig;

/// Run the monitoring loop until `cancel` is triggered.
pub async fn run(pipeline: Arc<Pipeline>, config: MonitorConfig, cancel: CancellationToken) {
    tracing::info!(
        server_id = %config.server_id,
        interval_secs = config.interval.as_secs(),
        has_recipient = config.recipient.is_some(),
        "Monitor loop started"
    );

    let mut interval = tokio::time::interval(config.interval);
    // Slow cycles push the next tick back; missed ticks are not replayed.
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Monitor loop stopping");
                break;
            }
            _ = interval.tick() => {
                let request = CycleRequest {
                    recipient_override: config.recipient.clone(),
                    ..CycleRequest::new(config.server_id.clone())
                };
                match pipeline.run_cycle(request).await {
                    Ok(report) => {
                        tracing::debug!(
                            state = ?report.state,
                            alerts = report.alerts.len(),
                            persisted = report.persisted,
                            "Scheduled cycle finished"
                        );
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "Scheduled cycle failed");
                    }
                }
            }
        }
    }
}
