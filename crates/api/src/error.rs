use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use hostwatch_core::error::CoreError;
use hostwatch_pipeline::{CycleError, SamplingError};
use serde_json::json;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and the pipeline's fatal errors,
/// and adds HTTP-specific variants. Implements [`IntoResponse`] to produce
/// consistent JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `hostwatch_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A database error from sqlx.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The host could not be sampled.
    #[error(transparent)]
    Sampling(#[from] SamplingError),

    /// A monitoring cycle failed.
    #[error(transparent)]
    Cycle(#[from] CycleError),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// No route or resource matched the request path.
    #[error("Not found: {0}")]
    NotFound(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Core(core) => classify_core_error(core),

            AppError::Database(err) => classify_sqlx_error(err),

            AppError::Sampling(err) => sampling_failed(err),

            AppError::Cycle(cycle) => match cycle {
                CycleError::Sampling(err) => sampling_failed(err),
                CycleError::Validation(msg) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
                }
                CycleError::Internal(msg) => internal(msg),
            },

            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::NotFound(path) => (
                StatusCode::NOT_FOUND,
                "NOT_FOUND",
                format!("No route for {path}"),
            ),
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

fn classify_core_error(core: &CoreError) -> (StatusCode, &'static str, String) {
    match core {
        CoreError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
    }
}

fn sampling_failed(err: &SamplingError) -> (StatusCode, &'static str, String) {
    tracing::error!(error = %err, "Host sampling failed");
    (
        StatusCode::SERVICE_UNAVAILABLE,
        "SAMPLING_FAILED",
        "Host metrics are currently unavailable".to_string(),
    )
}

fn internal(msg: &str) -> (StatusCode, &'static str, String) {
    tracing::error!(error = %msg, "Internal error");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        "An internal error occurred".to_string(),
    )
}

/// Classify a sqlx error into an HTTP status, error code, and message.
///
/// `RowNotFound` maps to 404. Everything else maps to 500 with a sanitized
/// message.
fn classify_sqlx_error(err: &sqlx::Error) -> (StatusCode, &'static str, String) {
    match err {
        sqlx::Error::RowNotFound => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            "Resource not found".to_string(),
        ),
        other => {
            tracing::error!(error = %other, "Database error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "An internal error occurred".to_string(),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn sampling_failure_is_service_unavailable() {
        let err = AppError::Cycle(CycleError::Sampling(SamplingError::Unavailable(
            "no sensors".into(),
        )));
        assert_eq!(status_of(err), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn validation_errors_are_bad_request() {
        assert_eq!(
            status_of(AppError::Core(CoreError::Validation("bad".into()))),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(AppError::Cycle(CycleError::Validation("bad".into()))),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn sampling_timeout_is_service_unavailable() {
        let err = AppError::Cycle(CycleError::Sampling(SamplingError::Timeout(
            std::time::Duration::from_secs(30),
        )));
        assert_eq!(status_of(err), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn unmatched_path_is_404() {
        assert_eq!(
            status_of(AppError::NotFound("/api/v1/nope".into())),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn row_not_found_is_404() {
        assert_eq!(
            status_of(AppError::Database(sqlx::Error::RowNotFound)),
            StatusCode::NOT_FOUND
        );
    }
}
