use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use gitboard_auth::AuthError;
use gitboard_core::{ApiResponse, ValidationError};

/// Errors surfaced at the HTTP boundary. Everything renders as the standard
/// envelope with the HTTP status mirroring `code`; internal errors are
/// masked and only logged in full.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{message}")]
    Validation {
        field: Option<String>,
        message: String,
    },

    #[error(transparent)]
    Auth(#[from] AuthError),
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            field: None,
            message: message.into(),
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        Self::Validation {
            field: Some(err.field.to_string()),
            message: err.message,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (code, message, field) = match self {
            ApiError::Validation { field, message } => (400, message, field),
            ApiError::Auth(err) if err.is_internal() => {
                tracing::error!(error = %err, "request failed with internal error");
                (500, "internal server error".to_string(), None)
            }
            ApiError::Auth(err) => (
                err.status(),
                err.to_string(),
                err.field().map(str::to_string),
            ),
        };

        let status = StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let body = match field {
            Some(field) => ApiResponse::<()>::error_with_field(code, message, field),
            None => ApiResponse::<()>::error(code, message),
        };
        (status, Json(body)).into_response()
    }
}
