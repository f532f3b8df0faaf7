//! Persisting what a cycle saw and what it delivered.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use hostwatch_core::alert::{join_messages, AlertDescriptor, AlertRecord};
use hostwatch_core::log_type::LogType;
use hostwatch_core::metrics::MetricsSnapshot;
use hostwatch_core::notification::{NotificationKind, NotificationRecord};
use hostwatch_core::recipient::Recipient;
use hostwatch_notify::{AttemptOutcome, Channel, DeliveryOutcome};
use serde::Serialize;

use crate::store::{AlertStore, LogRecord, StoreError};

/// Default upper bound on each store write.
pub const DEFAULT_WRITE_TIMEOUT: Duration = Duration::from_secs(10);

/// The records one cycle wrote (or tried to write).
#[derive(Debug, Clone, Serialize)]
pub struct RecordedBatch {
    pub log: LogRecord,
    pub alerts: Vec<AlertRecord>,
    /// False when any write failed.
    pub persisted: bool,
}

/// Writes log entries, alert records and notification history through an
/// [`AlertStore`].
///
/// Every write is bounded by a timeout. Store failures are logged and
/// reported through the return value; they never fail the caller.
#[derive(Clone)]
pub struct AlertRecorder {
    store: Arc<dyn AlertStore>,
    timeout: Duration,
}

impl AlertRecorder {
    pub fn new(store: Arc<dyn AlertStore>) -> Self {
        Self {
            store,
            timeout: DEFAULT_WRITE_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    async fn bounded(
        &self,
        write: impl Future<Output = Result<(), StoreError>>,
    ) -> Result<(), StoreError> {
        tokio::time::timeout(self.timeout, write)
            .await
            .unwrap_or(Err(StoreError::Timeout(self.timeout)))
    }

    /// Append the raw snapshot to the time series. Returns whether it stuck.
    pub async fn record_sample(&self, snapshot: &MetricsSnapshot) -> bool {
        match self.bounded(self.store.append_sample(snapshot)).await {
            Ok(()) => true,
            Err(e) => {
                tracing::error!(
                    server_id = snapshot.server_id(),
                    error = %e,
                    "Failed to persist metrics sample"
                );
                false
            }
        }
    }

    /// Append one operational log entry. Returns whether it stuck.
    pub async fn record_log(&self, log: &LogRecord) -> bool {
        match self.bounded(self.store.append_log(log)).await {
            Ok(()) => true,
            Err(e) => {
                tracing::error!(
                    server_id = %log.server_id,
                    log_type = %log.log_type,
                    error = %e,
                    "Failed to persist log entry"
                );
                false
            }
        }
    }

    /// Write one alert log entry and one alert record per descriptor.
    ///
    /// All records share one `recorded_at`. Alert records keep descriptor
    /// order.
    pub async fn record(
        &self,
        snapshot: &MetricsSnapshot,
        descriptors: &[AlertDescriptor],
        outcome: &DeliveryOutcome,
    ) -> RecordedBatch {
        let recorded_at = Utc::now();
        let server_id = snapshot.server_id();
        let delivered = outcome.delivered_via_push || outcome.delivered_via_sms;

        let log = LogRecord {
            server_id: server_id.to_string(),
            log_type: LogType::Alert,
            message: join_messages(descriptors),
            payload: serde_json::json!({ "metrics": snapshot }),
            recorded_at,
        };
        let alerts: Vec<AlertRecord> = descriptors
            .iter()
            .map(|d| AlertRecord::from_descriptor(server_id, d, delivered, recorded_at))
            .collect();

        let mut persisted = self.record_log(&log).await;

        for alert in &alerts {
            if let Err(e) = self.bounded(self.store.append_alert(alert)).await {
                tracing::error!(
                    server_id,
                    metric = %alert.metric,
                    error = %e,
                    "Failed to persist alert record"
                );
                persisted = false;
            }
        }

        tracing::info!(
            server_id,
            alerts = alerts.len(),
            delivered,
            persisted,
            "Alert batch recorded"
        );

        RecordedBatch {
            log,
            alerts,
            persisted,
        }
    }

    /// Append one history row per provider attempt in `outcome`.
    ///
    /// Returns whether every row was written.
    pub async fn record_notifications(
        &self,
        server_id: &str,
        kind: NotificationKind,
        recipient: &Recipient,
        body: &str,
        outcome: &DeliveryOutcome,
    ) -> bool {
        let records = notification_records(server_id, kind, recipient, body, outcome);
        let mut persisted = true;

        for record in &records {
            if let Err(e) = self.bounded(self.store.append_notification(record)).await {
                tracing::error!(
                    server_id,
                    provider = %record.provider,
                    error = %e,
                    "Failed to persist notification history"
                );
                persisted = false;
            }
        }
        persisted
    }
}

/// History rows for every attempt, in attempt order.
///
/// Skipped attempts carry no target because no address was used.
pub fn notification_records(
    server_id: &str,
    kind: NotificationKind,
    recipient: &Recipient,
    body: &str,
    outcome: &DeliveryOutcome,
) -> Vec<NotificationRecord> {
    let recorded_at = Utc::now();
    outcome
        .attempts
        .iter()
        .map(|attempt| {
            let target = match attempt.outcome {
                AttemptOutcome::Skipped => None,
                _ => address_for(recipient, attempt.channel).map(str::to_string),
            };
            NotificationRecord {
                server_id: server_id.to_string(),
                kind,
                channel: attempt.channel.as_str().to_string(),
                provider: attempt.provider.clone(),
                target,
                body: body.to_string(),
                status: attempt.outcome.as_str().to_string(),
                error_detail: attempt.error_detail.clone(),
                recorded_at,
            }
        })
        .collect()
}

fn address_for(recipient: &Recipient, channel: Channel) -> Option<&str> {
    match channel {
        Channel::Push => recipient.push_token.as_deref(),
        Channel::Sms => recipient.phone.as_deref(),
        Channel::Email => recipient.email.as_deref(),
    }
}
