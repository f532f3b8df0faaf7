//! On-demand monitoring cycles.

use axum::extract::State;
use axum::http::header::AUTHORIZATION;
use axum::http::HeaderMap;
use axum::Json;
use hostwatch_core::metrics::DEFAULT_SERVER_ID;
use hostwatch_core::recipient::Recipient;
use hostwatch_core::thresholds::{EvaluationMode, ThresholdOverrides};
use hostwatch_pipeline::{CycleReport, CycleRequest};
use serde::Deserialize;

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for `POST /monitor/cycles`. Every field is optional.
#[derive(Debug, Default, Deserialize)]
pub struct RunCycleInput {
    pub server_id: Option<String>,
    #[serde(default)]
    pub thresholds: ThresholdOverrides,
    /// Skip threshold checks and send the synthetic test alert.
    #[serde(default)]
    pub forced: bool,
    pub recipient: Option<RecipientInput>,
}

/// An explicit recipient supplied by the caller.
#[derive(Debug, Deserialize)]
pub struct RecipientInput {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub push_token: Option<String>,
}

impl From<RecipientInput> for Recipient {
    fn from(input: RecipientInput) -> Self {
        Recipient {
            display_name: input.name.unwrap_or_default(),
            phone: input.phone,
            email: input.email,
            push_token: input.push_token,
        }
    }
}

/// Extract the token from an `Authorization: Bearer <token>` header.
pub(crate) fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
}

/// POST /monitor/cycles
///
/// Run one full cycle: sample, evaluate, notify and record. The optional
/// bearer token identifies the recipient when the body names none.
pub async fn run_cycle(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(input): Json<RunCycleInput>,
) -> AppResult<Json<DataResponse<CycleReport>>> {
    let request = CycleRequest {
        server_id: input
            .server_id
            .unwrap_or_else(|| DEFAULT_SERVER_ID.to_string()),
        thresholds: input.thresholds.resolve(),
        mode: EvaluationMode::from_forced(input.forced),
        recipient_override: input.recipient.map(Recipient::from),
        session_token: bearer_token(&headers),
    };

    tracing::info!(
        server_id = %request.server_id,
        forced = input.forced,
        has_override = request.recipient_override.is_some(),
        has_session = request.session_token.is_some(),
        "Running monitoring cycle"
    );

    let report = state.pipeline.run_cycle(request).await?;
    Ok(Json(DataResponse { data: report }))
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    #[test]
    fn bearer_token_is_extracted() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer abc.def"));
        assert_eq!(bearer_token(&headers).as_deref(), Some("abc.def"));
    }

    #[test]
    fn non_bearer_authorization_is_ignored() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic dXNlcjpwYXNz"));
        assert_eq!(bearer_token(&headers), None);
        assert_eq!(bearer_token(&HeaderMap::new()), None);
    }

    #[test]
    fn empty_body_deserializes_to_defaults() {
        let input: RunCycleInput = serde_json::from_str("{}").unwrap();
        assert!(!input.forced);
        assert!(input.server_id.is_none());
        assert_eq!(input.thresholds, ThresholdOverrides::default());
    }
}
