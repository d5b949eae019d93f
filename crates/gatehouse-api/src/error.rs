//! Maps domain `AppError` to HTTP responses.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use gatehouse_core::error::AppError;

/// Standard API error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    /// Human-readable message.
    pub message: String,
}

/// Handler error: an [`AppError`] rendered as `{message}` with its status.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let err = self.0;
        let status = StatusCode::from_u16(err.kind.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let message = if status.is_server_error() {
            tracing::error!(kind = %err.kind, error = ?err, "Request failed");
            "Internal server error".to_string()
        } else {
            tracing::debug!(kind = %err.kind, message = %err.message, "Request rejected");
            err.message
        };

        (status, Json(ApiErrorResponse { message })).into_response()
    }
}

/// Result type of every handler.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use gatehouse_core::error::ErrorKind;

    #[test]
    fn test_status_follows_error_kind() {
        let cases = [
            (AppError::invalid_input("x"), StatusCode::BAD_REQUEST),
            (AppError::already_exists("x"), StatusCode::BAD_REQUEST),
            (AppError::invalid_code("x"), StatusCode::BAD_REQUEST),
            (AppError::not_found("x"), StatusCode::BAD_REQUEST),
            (AppError::unauthorized("x"), StatusCode::UNAUTHORIZED),
            (AppError::invalid_token("x"), StatusCode::UNAUTHORIZED),
            (AppError::token_expired("x"), StatusCode::UNAUTHORIZED),
            (AppError::configuration("x"), StatusCode::INTERNAL_SERVER_ERROR),
            (
                AppError::new(ErrorKind::Dispatch, "x"),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError(err).into_response().status(), status);
        }
    }
}
