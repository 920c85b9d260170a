use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use rolewarden_core::AppError;
use serde::Serialize;
use tracing::{error, warn};
use ts_rs::TS;

/// API error payload.
///
/// `code` is stable across message wording changes so dashboards and the
/// gateway bridge can branch on it.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/error-response.ts"
)]
pub struct ErrorResponse {
    code: &'static str,
    message: String,
}

/// HTTP API error wrapper around core application errors.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl ApiError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self.0 {
            AppError::Validation(_) => (StatusCode::BAD_REQUEST, "validation"),
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            AppError::Conflict(_) => (StatusCode::CONFLICT, "conflict"),
            AppError::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "unauthorized"),
            AppError::Forbidden(_) => (StatusCode::FORBIDDEN, "forbidden"),
            AppError::Platform(_) => (StatusCode::BAD_GATEWAY, "platform_unavailable"),
            AppError::Timeout(_) => (StatusCode::GATEWAY_TIMEOUT, "platform_timeout"),
            AppError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal"),
        }
    }
}

impl From<AppError> for ApiError {
    fn from(value: AppError) -> Self {
        Self(value)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        match &self.0 {
            AppError::Internal(message) => error!(code, %message, "request failed"),
            AppError::Platform(message) | AppError::Timeout(message) => {
                warn!(code, %message, "platform call failed during request");
            }
            _ => {}
        }

        let payload = Json(ErrorResponse {
            code,
            message: self.0.to_string(),
        });

        (status, payload).into_response()
    }
}

/// Standard API result type.
pub type ApiResult<T> = Result<T, ApiError>;
