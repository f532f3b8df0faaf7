//! Shared query parameter types for API handlers.

use serde::Deserialize;

/// Pagination with an optional server filter (`?server_id=&limit=&offset=`).
///
/// Values are clamped with `clamp_limit` / `clamp_offset` before they reach
/// the repositories.
#[derive(Debug, Default, Deserialize)]
pub struct HistoryParams {
    pub server_id: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Optional server selector (`?server_id=`).
#[derive(Debug, Default, Deserialize)]
pub struct ServerParams {
    pub server_id: Option<String>,
}

/// Notification history filters (`?server_id=&channel=&limit=&offset=`).
#[derive(Debug, Default, Deserialize)]
pub struct NotificationParams {
    pub server_id: Option<String>,
    /// One of `push`, `sms` or `email`.
    pub channel: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}
