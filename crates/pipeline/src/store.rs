//! Durable append-only storage for the alert cycle.

use std::time::Duration;

use async_trait::async_trait;
use hostwatch_core::alert::AlertRecord;
use hostwatch_core::metrics::MetricsSnapshot;
use hostwatch_core::notification::NotificationRecord;
use hostwatch_db::models::monitoring::{CreateAlert, CreateMetricsSample, CreateNotification};
use hostwatch_db::repositories::{AlertRepo, LogRepo, MetricsSampleRepo, NotificationRepo};
use hostwatch_db::DbPool;

pub use hostwatch_db::models::monitoring::CreateLog as LogRecord;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The store refused the write for a reason other than the database.
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Store write did not finish within {0:?}")]
    Timeout(Duration),
}

/// Append-only sink for samples, log entries, alert records and
/// notification history.
///
/// Implementations must be safe to call from concurrent cycles.
#[async_trait]
pub trait AlertStore: Send + Sync {
    async fn append_sample(&self, snapshot: &MetricsSnapshot) -> Result<(), StoreError>;

    async fn append_log(&self, log: &LogRecord) -> Result<(), StoreError>;

    async fn append_alert(&self, alert: &AlertRecord) -> Result<(), StoreError>;

    async fn append_notification(&self, notification: &NotificationRecord) -> Result<(), StoreError>;
}

/// [`AlertStore`] backed by the PostgreSQL repositories.
#[derive(Clone)]
pub struct PgAlertStore {
    pool: DbPool,
}

impl PgAlertStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AlertStore for PgAlertStore {
    async fn append_sample(&self, snapshot: &MetricsSnapshot) -> Result<(), StoreError> {
        MetricsSampleRepo::insert(&self.pool, &CreateMetricsSample::from(snapshot)).await?;
        Ok(())
    }

    async fn append_log(&self, log: &LogRecord) -> Result<(), StoreError> {
        LogRepo::insert(&self.pool, log).await?;
        Ok(())
    }

    async fn append_alert(&self, alert: &AlertRecord) -> Result<(), StoreError> {
        let stored = AlertRepo::insert(&self.pool, &CreateAlert::from(alert)).await?;
        tracing::debug!(alert_id = stored.id, metric = %alert.metric, "Alert persisted");
        Ok(())
    }

    async fn append_notification(&self, notification: &NotificationRecord) -> Result<(), StoreError> {
        NotificationRepo::insert(&self.pool, &CreateNotification::from(notification)).await?;
        Ok(())
    }
}
