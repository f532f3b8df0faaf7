//! Route definitions for on-demand messages.

use axum::routing::post;
use axum::Router;

use crate::handlers::messages;
use crate::state::AppState;

/// Routes mounted at `/messages`.
///
/// ```text
/// POST /status          -> send_status
/// POST /alert           -> send_alert
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/status", post(messages::send_status))
        .route("/alert", post(messages::send_alert))
}
