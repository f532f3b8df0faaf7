//! Repository for the `notifications` table (append-only).

use sqlx::PgPool;

use crate::models::monitoring::{CreateNotification, StoredNotification};

const COLUMNS: &str = "\
    id, server_id, kind, channel, provider, target, body, status, error_detail, \
    recorded_at, created_at";

/// Outbound notification history.
pub struct NotificationRepo;

impl NotificationRepo {
    /// Append one provider attempt.
    pub async fn insert(
        pool: &PgPool,
        notification: &CreateNotification,
    ) -> Result<StoredNotification, sqlx::Error> {
        let query = format!(
            "INSERT INTO notifications \
                (server_id, kind, channel, provider, target, body, status, error_detail, recorded_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, StoredNotification>(&query)
            .bind(&notification.server_id)
            .bind(&notification.kind)
            .bind(&notification.channel)
            .bind(&notification.provider)
            .bind(&notification.target)
            .bind(&notification.body)
            .bind(&notification.status)
            .bind(&notification.error_detail)
            .bind(notification.recorded_at)
            .fetch_one(pool)
            .await
    }

    /// List attempts newest-first, optionally restricted to one server and
    /// one channel.
    pub async fn list_recent(
        pool: &PgPool,
        server_id: Option<&str>,
        channel: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<StoredNotification>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM notifications \
             WHERE ($1::TEXT IS NULL OR server_id = $1) \
               AND ($2::TEXT IS NULL OR channel = $2) \
             ORDER BY recorded_at DESC, id DESC \
             LIMIT $3 OFFSET $4"
        );
        sqlx::query_as::<_, StoredNotification>(&query)
            .bind(server_id)
            .bind(channel)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }
}
