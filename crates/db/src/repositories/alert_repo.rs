//! Repository for the `alerts` table (append-only).

use sqlx::PgPool;

use crate::models::monitoring::{CreateAlert, StoredAlert};

/// Column list for `alerts` SELECT queries.
const COLUMNS: &str = "\
    id, server_id, metric, value, threshold, message, delivered, \
    recorded_at, created_at";

/// Provides insert and query operations for alert records.
pub struct AlertRepo;

impl AlertRepo {
    /// Append one alert row.
    pub async fn insert(pool: &PgPool, alert: &CreateAlert) -> Result<StoredAlert, sqlx::Error> {
        let query = format!(
            "INSERT INTO alerts \
                (server_id, metric, value, threshold, message, delivered, recorded_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, StoredAlert>(&query)
            .bind(&alert.server_id)
            .bind(&alert.metric)
            .bind(alert.value)
            .bind(alert.threshold)
            .bind(&alert.message)
            .bind(alert.delivered)
            .bind(alert.recorded_at)
            .fetch_one(pool)
            .await
    }

    /// List alerts newest-first, optionally restricted to one server.
    ///
    /// Rows written in the same batch share `recorded_at`; `id` keeps them
    /// in insertion order within the batch.
    pub async fn list_recent(
        pool: &PgPool,
        server_id: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<StoredAlert>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM alerts \
             WHERE ($1::TEXT IS NULL OR server_id = $1) \
             ORDER BY recorded_at DESC, id ASC \
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, StoredAlert>(&query)
            .bind(server_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }
}
