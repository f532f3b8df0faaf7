//! Monitoring entity models and DTOs.
//!
//! Models for host metric samples, alert records, log entries and outbound
//! notification history. All four tables are append-only.

use hostwatch_core::alert::AlertRecord;
use hostwatch_core::log_type::LogType;
use hostwatch_core::metrics::MetricsSnapshot;
use hostwatch_core::notification::NotificationRecord;
use hostwatch_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

// ---------------------------------------------------------------------------
// Metric samples
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct MetricsSample {
    pub id: DbId,
    pub server_id: String,
    pub cpu_pct: f64,
    pub memory_pct: f64,
    pub disk_used_pct: f64,
    pub temperature_c: f64,
    pub captured_at: Timestamp,
    pub created_at: Timestamp,
}

/// DTO for inserting a metrics sample.
#[derive(Debug, Clone)]
pub struct CreateMetricsSample {
    pub server_id: String,
    pub cpu_pct: f64,
    pub memory_pct: f64,
    pub disk_used_pct: f64,
    pub temperature_c: f64,
    pub captured_at: Timestamp,
}

impl From<&MetricsSnapshot> for CreateMetricsSample {
    fn from(snapshot: &MetricsSnapshot) -> Self {
        Self {
            server_id: snapshot.server_id().to_string(),
            cpu_pct: snapshot.cpu_pct(),
            memory_pct: snapshot.memory_pct(),
            disk_used_pct: snapshot.disk_used_pct(),
            temperature_c: snapshot.temperature_c(),
            captured_at: snapshot.captured_at(),
        }
    }
}

// ---------------------------------------------------------------------------
// Alerts
// ---------------------------------------------------------------------------

/// A persisted alert row.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct StoredAlert {
    pub id: DbId,
    pub server_id: String,
    pub metric: String,
    pub value: f64,
    pub threshold: f64,
    pub message: String,
    pub delivered: bool,
    pub recorded_at: Timestamp,
    pub created_at: Timestamp,
}

/// DTO for inserting an alert row.
#[derive(Debug, Clone)]
pub struct CreateAlert {
    pub server_id: String,
    pub metric: String,
    pub value: f64,
    pub threshold: f64,
    pub message: String,
    pub delivered: bool,
    pub recorded_at: Timestamp,
}

impl From<&AlertRecord> for CreateAlert {
    fn from(record: &AlertRecord) -> Self {
        Self {
            server_id: record.server_id.clone(),
            metric: record.metric.as_str().to_string(),
            value: record.value,
            threshold: record.threshold,
            message: record.message.clone(),
            delivered: record.delivered,
            recorded_at: record.recorded_at,
        }
    }
}

// ---------------------------------------------------------------------------
// Logs
// ---------------------------------------------------------------------------

/// A persisted log row.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct StoredLog {
    pub id: DbId,
    pub server_id: String,
    pub log_type: String,
    pub message: String,
    pub payload: serde_json::Value,
    pub recorded_at: Timestamp,
    pub created_at: Timestamp,
}

/// DTO for inserting a log row.
#[derive(Debug, Clone, Serialize)]
pub struct CreateLog {
    pub server_id: String,
    pub log_type: LogType,
    pub message: String,
    pub payload: serde_json::Value,
    pub recorded_at: Timestamp,
}

// ---------------------------------------------------------------------------
// Notifications
// ---------------------------------------------------------------------------

/// A persisted provider attempt.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct StoredNotification {
    pub id: DbId,
    pub server_id: String,
    pub kind: String,
    pub channel: String,
    pub provider: String,
    pub target: Option<String>,
    pub body: String,
    pub status: String,
    pub error_detail: Option<String>,
    pub recorded_at: Timestamp,
    pub created_at: Timestamp,
}

/// DTO for inserting a notification row.
#[derive(Debug, Clone)]
pub struct CreateNotification {
    pub server_id: String,
    pub kind: String,
    pub channel: String,
    pub provider: String,
    pub target: Option<String>,
    pub body: String,
    pub status: String,
    pub error_detail: Option<String>,
    pub recorded_at: Timestamp,
}

impl From<&NotificationRecord> for CreateNotification {
    fn from(record: &NotificationRecord) -> Self {
        Self {
            server_id: record.server_id.clone(),
            kind: record.kind.as_str().to_string(),
            channel: record.channel.clone(),
            provider: record.provider.clone(),
            target: record.target.clone(),
            body: record.body.clone(),
            status: record.status.clone(),
            error_detail: record.error_detail.clone(),
            recorded_at: record.recorded_at,
        }
    }
}
