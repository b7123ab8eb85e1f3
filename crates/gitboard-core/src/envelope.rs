//! The response envelope shared by every Gitboard endpoint.
//!
//! `{ code, message, data, success, field? }`. The HTTP status mirrors
//! `code` for error cases, and `field` names the offending input when a
//! validation or domain error can be pinned to one.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub code: u16,
    pub message: String,
    pub data: Option<T>,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self::ok_with_message(data, "ok")
    }

    pub fn ok_with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            code: 200,
            message: message.into(),
            data: Some(data),
            success: true,
            field: None,
        }
    }

    pub fn error(code: u16, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
            success: false,
            field: None,
        }
    }

    pub fn error_with_field(
        code: u16,
        message: impl Into<String>,
        field: impl Into<String>,
    ) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
            success: false,
            field: Some(field.into()),
        }
    }
}
