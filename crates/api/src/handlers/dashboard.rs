//! Handlers for the monitoring dashboard.

use axum::extract::{Query, State};
use axum::Json;
use hostwatch_core::metrics::{MetricsSnapshot, DEFAULT_SERVER_ID};
use hostwatch_core::thresholds::ThresholdSet;
use serde::Serialize;

use crate::error::AppResult;
use crate::query::ServerParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// Live host status for the dashboard widgets.
#[derive(Debug, Serialize)]
pub struct DashboardStatus {
    pub snapshot: MetricsSnapshot,
    /// The default limits, so the UI can colour gauges.
    pub thresholds: ThresholdSet,
}

/// GET /dashboard/status
///
/// Sample the host now. Nothing is persisted and no alerts are evaluated.
pub async fn status(
    State(state): State<AppState>,
    Query(params): Query<ServerParams>,
) -> AppResult<Json<DataResponse<DashboardStatus>>> {
    let server_id = params
        .server_id
        .unwrap_or_else(|| DEFAULT_SERVER_ID.to_string());
    let snapshot = state.sampler.sample(&server_id).await?;

    Ok(Json(DataResponse {
        data: DashboardStatus {
            snapshot,
            thresholds: ThresholdSet::default(),
        },
    }))
}
