//! Route definitions for persisted monitoring history.

use axum::routing::get;
use axum::Router;

use crate::handlers::history;
use crate::state::AppState;

/// History routes, mounted directly under `/api/v1`.
///
/// ```text
/// GET  /alerts                 -> list_alerts
/// GET  /logs                   -> list_logs
/// GET  /notifications          -> list_notifications
/// GET  /metrics/{server_id}    -> get_metrics_history
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/alerts", get(history::list_alerts))
        .route("/logs", get(history::list_logs))
        .route("/notifications", get(history::list_notifications))
        .route("/metrics/{server_id}", get(history::get_metrics_history))
}
