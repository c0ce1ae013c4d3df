use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::report::models::ReportError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Remote service error: {0}")]
    RemoteService(String),
}

impl From<ReportError> for AppError {
    fn from(e: ReportError) -> Self {
        match e {
            ReportError::Validation { .. } => AppError::Validation(e.to_string()),
            ReportError::RemoteService(_) => AppError::RemoteService(e.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg),
            AppError::RemoteService(msg) => {
                tracing::error!("Remote service error: {msg}");
                (StatusCode::BAD_GATEWAY, "REMOTE_SERVICE_ERROR", msg)
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_maps_to_bad_request() {
        let err: AppError = ReportError::Validation {
            missing: vec!["Specimen Details"],
        }
        .into();
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_remote_failure_maps_to_bad_gateway() {
        let err: AppError = ReportError::RemoteService("timed out".to_string()).into();
        assert!(matches!(&err, AppError::RemoteService(m) if m == "API Error: timed out"));
        assert_eq!(err.into_response().status(), StatusCode::BAD_GATEWAY);
    }
}
