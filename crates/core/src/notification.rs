//! Outbound notification history.

use serde::{Deserialize, Serialize};

use crate::types::Timestamp;

/// Why a notification was sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    /// Threshold breach found by an alert cycle.
    Alert,
    /// Operator-raised alert.
    Manual,
    /// Current host metrics sent on request.
    Status,
    /// Free-form text sent on request.
    Message,
}

impl NotificationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            NotificationKind::Alert => "alert",
            NotificationKind::Manual => "manual",
            NotificationKind::Status => "status",
            NotificationKind::Message => "message",
        }
    }
}

impl std::fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One provider attempt, as written to the notification history.
///
/// `channel` is `push`, `sms` or `email`; `status` is `sent`, `failed` or
/// `skipped`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NotificationRecord {
    pub server_id: String,
    pub kind: NotificationKind,
    pub channel: String,
    pub provider: String,
    pub target: Option<String>,
    pub body: String,
    pub status: String,
    pub error_detail: Option<String>,
    pub recorded_at: Timestamp,
}
