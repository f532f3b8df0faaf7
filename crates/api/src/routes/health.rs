//! Liveness and readiness at `/health`.
//!
//! The service counts as degraded when the database is unreachable or no
//! provider could deliver an alert.

use axum::extract::State;
use axum::{routing::get, Json, Router};
use hostwatch_notify::ProviderSummary;
use serde::Serialize;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// `ok` or `degraded`.
    pub status: &'static str,
    pub version: &'static str,
    pub db_healthy: bool,
    /// Providers the dispatcher will try, by channel.
    pub providers: ProviderSummary,
    /// Whether the background monitor loop is running.
    pub monitor_enabled: bool,
    pub monitor_server_id: String,
}

fn overall_status(db_healthy: bool, providers: &ProviderSummary) -> &'static str {
    if db_healthy && providers.can_notify() {
        "ok"
    } else {
        "degraded"
    }
}

/// GET /health
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let db_healthy = hostwatch_db::health_check(&state.pool).await.is_ok();
    let providers = state.pipeline.providers();

    if !providers.can_notify() {
        tracing::warn!("No notification provider configured");
    }

    Json(HealthResponse {
        status: overall_status(db_healthy, &providers),
        version: env!("CARGO_PKG_VERSION"),
        db_healthy,
        providers,
        monitor_enabled: state.config.monitor.enabled,
        monitor_server_id: state.config.monitor.server_id.clone(),
    })
}

/// Mounted at the root, outside `/api/v1`.
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
