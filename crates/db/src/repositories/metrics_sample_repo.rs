//! Repository for the `metrics_samples` table (append-only time-series).

use hostwatch_core::types::Timestamp;
use sqlx::PgPool;

use crate::models::monitoring::{CreateMetricsSample, MetricsSample};

/// Column list for `metrics_samples` SELECT queries (includes `id` and `created_at`).
const COLUMNS: &str = "\
    id, server_id, cpu_pct, memory_pct, disk_used_pct, temperature_c, \
    captured_at, created_at";

/// Provides query operations for host metric samples.
pub struct MetricsSampleRepo;

impl MetricsSampleRepo {
    /// Insert a single metrics sample.
    pub async fn insert(
        pool: &PgPool,
        sample: &CreateMetricsSample,
    ) -> Result<MetricsSample, sqlx::Error> {
        let query = format!(
            "INSERT INTO metrics_samples \
                (server_id, cpu_pct, memory_pct, disk_used_pct, temperature_c, captured_at) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, MetricsSample>(&query)
            .bind(&sample.server_id)
            .bind(sample.cpu_pct)
            .bind(sample.memory_pct)
            .bind(sample.disk_used_pct)
            .bind(sample.temperature_c)
            .bind(sample.captured_at)
            .fetch_one(pool)
            .await
    }

    /// Get samples for a server captured at or after `since`, newest first.
    pub async fn get_for_server(
        pool: &PgPool,
        server_id: &str,
        since: Timestamp,
    ) -> Result<Vec<MetricsSample>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM metrics_samples \
             WHERE server_id = $1 AND captured_at >= $2 \
             ORDER BY captured_at DESC"
        );
        sqlx::query_as::<_, MetricsSample>(&query)
            .bind(server_id)
            .bind(since)
            .fetch_all(pool)
            .await
    }

    /// Get the most recent sample for a server, if any.
    pub async fn get_latest(
        pool: &PgPool,
        server_id: &str,
    ) -> Result<Option<MetricsSample>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM metrics_samples \
             WHERE server_id = $1 \
             ORDER BY captured_at DESC LIMIT 1"
        );
        sqlx::query_as::<_, MetricsSample>(&query)
            .bind(server_id)
            .fetch_optional(pool)
            .await
    }
}
