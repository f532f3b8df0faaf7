//! Repository for the `logs` table (append-only).

use sqlx::PgPool;

use crate::models::monitoring::{CreateLog, StoredLog};

const COLUMNS: &str = "id, server_id, log_type, message, payload, recorded_at, created_at";

pub struct LogRepo;

impl LogRepo {
    /// Append one log row.
    pub async fn insert(pool: &PgPool, log: &CreateLog) -> Result<StoredLog, sqlx::Error> {
        let query = format!(
            "INSERT INTO logs (server_id, log_type, message, payload, recorded_at) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, StoredLog>(&query)
            .bind(&log.server_id)
            .bind(log.log_type.as_str())
            .bind(&log.message)
            .bind(&log.payload)
            .bind(log.recorded_at)
            .fetch_one(pool)
            .await
    }

    /// List log entries newest-first, optionally restricted to one server.
    pub async fn list_recent(
        pool: &PgPool,
        server_id: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<StoredLog>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM logs \
             WHERE ($1::TEXT IS NULL OR server_id = $1) \
             ORDER BY recorded_at DESC, id DESC \
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, StoredLog>(&query)
            .bind(server_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }
}
