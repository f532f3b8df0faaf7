//! Route definitions for on-demand monitoring cycles.

use axum::routing::post;
use axum::Router;

use crate::handlers::monitor;
use crate::state::AppState;

/// Routes mounted at `/monitor`.
///
/// ```text
/// POST /cycles          -> run_cycle
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/cycles", post(monitor::run_cycle))
}
