//! Read endpoints over persisted alerts, logs, notifications and metric
//! samples.

use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::{Duration, Utc};
use hostwatch_core::metrics::validate_server_id;
use hostwatch_db::models::monitoring::{MetricsSample, StoredAlert, StoredLog, StoredNotification};
use hostwatch_db::repositories::{AlertRepo, LogRepo, MetricsSampleRepo, NotificationRepo};
use hostwatch_notify::Channel;
use hostwatch_db::{clamp_limit, clamp_offset};
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::query::{HistoryParams, NotificationParams};
use crate::response::DataResponse;
use crate::state::AppState;

/// Longest metrics window a caller may request.
const MAX_HISTORY_HOURS: i64 = 168;

/// Query parameters for the metrics history endpoint.
#[derive(Debug, Deserialize)]
pub struct MetricsQuery {
    /// How many hours of history to return (default: 1).
    pub hours: Option<i64>,
}

/// GET /alerts
///
/// Recent alert records, newest first.
pub async fn list_alerts(
    State(state): State<AppState>,
    Query(params): Query<HistoryParams>,
) -> AppResult<Json<DataResponse<Vec<StoredAlert>>>> {
    let alerts = AlertRepo::list_recent(
        &state.pool,
        params.server_id.as_deref(),
        clamp_limit(params.limit),
        clamp_offset(params.offset),
    )
    .await?;
    Ok(Json(DataResponse { data: alerts }))
}

/// GET /logs
///
/// Recent log entries, newest first.
pub async fn list_logs(
    State(state): State<AppState>,
    Query(params): Query<HistoryParams>,
) -> AppResult<Json<DataResponse<Vec<StoredLog>>>> {
    let logs = LogRepo::list_recent(
        &state.pool,
        params.server_id.as_deref(),
        clamp_limit(params.limit),
        clamp_offset(params.offset),
    )
    .await?;
    Ok(Json(DataResponse { data: logs }))
}

/// GET /notifications
///
/// Recent provider attempts, newest first, optionally for one channel.
pub async fn list_notifications(
    State(state): State<AppState>,
    Query(params): Query<NotificationParams>,
) -> AppResult<Json<DataResponse<Vec<StoredNotification>>>> {
    let channel = params.channel.as_deref().map(parse_channel).transpose()?;
    let notifications = NotificationRepo::list_recent(
        &state.pool,
        params.server_id.as_deref(),
        channel.map(Channel::as_str),
        clamp_limit(params.limit),
        clamp_offset(params.offset),
    )
    .await?;
    Ok(Json(DataResponse { data: notifications }))
}

fn parse_channel(raw: &str) -> Result<Channel, AppError> {
    match raw {
        "push" => Ok(Channel::Push),
        "sms" => Ok(Channel::Sms),
        "email" => Ok(Channel::Email),
        other => Err(AppError::BadRequest(format!(
            "Unknown channel '{other}', expected push, sms or email"
        ))),
    }
}

/// GET /metrics/{server_id}
///
/// Metric samples for one server over the last `hours` hours.
pub async fn get_metrics_history(
    State(state): State<AppState>,
    Path(server_id): Path<String>,
    Query(query): Query<MetricsQuery>,
) -> AppResult<Json<DataResponse<Vec<MetricsSample>>>> {
    let hours = query.hours.unwrap_or(1);
    if !(1..=MAX_HISTORY_HOURS).contains(&hours) {
        return Err(AppError::BadRequest(format!(
            "hours must be between 1 and {MAX_HISTORY_HOURS}"
        )));
    }
    validate_server_id(&server_id)?;

    let since = Utc::now() - Duration::hours(hours);
    let samples = MetricsSampleRepo::get_for_server(&state.pool, &server_id, since).await?;
    Ok(Json(DataResponse { data: samples }))
}
