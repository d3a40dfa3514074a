//! Maps domain `AppError` to HTTP responses.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use validator::ValidationErrors;

use busway_core::error::{AppError, ErrorKind};
use busway_core::types::response::ApiErrorResponse;

/// Error returned by handlers and extractors.
///
/// Wraps [`AppError`] so `?` works on every service call, and optionally
/// carries field-level validation details.
#[derive(Debug)]
pub struct ApiError {
    /// The domain error.
    pub error: AppError,
    /// Field-level details, rendered under `details`.
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    /// HTTP status and machine-readable code for an error kind.
    pub fn status_and_code(kind: ErrorKind) -> (StatusCode, &'static str) {
        match kind {
            ErrorKind::NotFound => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            ErrorKind::Authentication => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            ErrorKind::Authorization => (StatusCode::FORBIDDEN, "FORBIDDEN"),
            ErrorKind::Validation => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            ErrorKind::Conflict => (StatusCode::CONFLICT, "CONFLICT"),
            ErrorKind::ExternalService => (StatusCode::BAD_GATEWAY, "EXTERNAL_SERVICE_ERROR"),
            ErrorKind::ServiceUnavailable => {
                (StatusCode::SERVICE_UNAVAILABLE, "SERVICE_UNAVAILABLE")
            }
            ErrorKind::Internal
            | ErrorKind::Database
            | ErrorKind::Configuration
            | ErrorKind::Serialization => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }
}

impl From<AppError> for ApiError {
    fn from(error: AppError) -> Self {
        Self {
            error,
            details: None,
        }
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        Self {
            error: AppError::validation("Invalid request body"),
            details: serde_json::to_value(&errors).ok(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = Self::status_and_code(self.error.kind);

        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self.error, "Internal server error");
            "Internal server error".to_string()
        } else {
            self.error.message.clone()
        };

        let body = ApiErrorResponse {
            error: code.to_string(),
            message,
            details: self.details,
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_map_to_statuses() {
        let cases = [
            (ErrorKind::NotFound, StatusCode::NOT_FOUND),
            (ErrorKind::Authentication, StatusCode::UNAUTHORIZED),
            (ErrorKind::Authorization, StatusCode::FORBIDDEN),
            (ErrorKind::Validation, StatusCode::BAD_REQUEST),
            (ErrorKind::Conflict, StatusCode::CONFLICT),
            (ErrorKind::ExternalService, StatusCode::BAD_GATEWAY),
            (ErrorKind::ServiceUnavailable, StatusCode::SERVICE_UNAVAILABLE),
            (ErrorKind::Database, StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (kind, status) in cases {
            assert_eq!(ApiError::status_and_code(kind).0, status, "{kind:?}");
        }
    }

    #[test]
    fn internal_details_are_not_leaked() {
        let response = ApiError::from(AppError::database("relation users does not exist"))
            .into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
