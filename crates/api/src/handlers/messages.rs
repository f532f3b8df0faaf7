//! Status reports and manual alerts sent on demand.

use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use hostwatch_core::metrics::DEFAULT_SERVER_ID;
use hostwatch_core::recipient::Recipient;
use hostwatch_pipeline::{ManualAlertRequest, MessageReport, StatusRequest};
use serde::Deserialize;

use crate::error::AppResult;
use crate::handlers::monitor::{bearer_token, RecipientInput};
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for `POST /messages/status`.
#[derive(Debug, Default, Deserialize)]
pub struct StatusInput {
    pub server_id: Option<String>,
    /// Custom text. Omitted or blank sends the current status summary.
    pub message: Option<String>,
    pub recipient: Option<RecipientInput>,
}

/// Request body for `POST /messages/alert`.
#[derive(Debug, Deserialize)]
pub struct AlertInput {
    pub server_id: Option<String>,
    pub message: String,
    pub recipient: Option<RecipientInput>,
}

/// POST /messages/status
///
/// Text the caller's message, or a fresh status summary, over SMS.
pub async fn send_status(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(input): Json<StatusInput>,
) -> AppResult<Json<DataResponse<MessageReport>>> {
    let request = StatusRequest {
        server_id: input
            .server_id
            .unwrap_or_else(|| DEFAULT_SERVER_ID.to_string()),
        text: input.message,
        recipient_override: input.recipient.map(Recipient::from),
        session_token: bearer_token(&headers),
    };

    tracing::info!(
        server_id = %request.server_id,
        custom = request.text.is_some(),
        has_override = request.recipient_override.is_some(),
        "Sending status report"
    );

    let report = state.pipeline.send_status_report(request).await?;
    Ok(Json(DataResponse { data: report }))
}

/// POST /messages/alert
///
/// Log an operator alert and deliver it over push, SMS and email.
pub async fn send_alert(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(input): Json<AlertInput>,
) -> AppResult<Json<DataResponse<MessageReport>>> {
    let request = ManualAlertRequest {
        server_id: input
            .server_id
            .unwrap_or_else(|| DEFAULT_SERVER_ID.to_string()),
        message: input.message,
        recipient_override: input.recipient.map(Recipient::from),
        session_token: bearer_token(&headers),
    };

    tracing::info!(
        server_id = %request.server_id,
        has_override = request.recipient_override.is_some(),
        "Sending manual alert"
    );

    let report = state.pipeline.send_manual_alert(request).await?;
    Ok(Json(DataResponse { data: report }))
}
