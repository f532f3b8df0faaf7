pub mod dashboard;
pub mod health;
pub mod history;
pub mod messages;
pub mod monitor;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /dashboard/status                    live host snapshot
///
/// /monitor/cycles                      run one alert cycle (POST)
///
/// /messages/status                     text a status report (POST)
/// /messages/alert                      send a manual alert (POST)
///
/// /alerts                              recent alert records
/// /logs                                recent log entries
/// /notifications                       provider attempt history
/// /metrics/{server_id}                 metric sample history
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/dashboard", dashboard::router())
        .nest("/monitor", monitor::router())
        .nest("/messages", messages::router())
        .merge(history::router())
}
