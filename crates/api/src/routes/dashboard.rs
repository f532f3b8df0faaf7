use axum::routing::get;
use axum::Router;

use crate::handlers::dashboard;
use crate::state::AppState;

/// Routes mounted at `/dashboard`.
///
/// ```text
/// GET  /status          -> status
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/status", get(dashboard::status))
}
