use axum::Json;
use axum::extract::State;
use serde_json::{Value, json};

use gitboard_core::{
    ApiResponse, LoginRequest, RefreshRequest, RegisterRequest, ResetPasswordRequest,
    SendCodeRequest,
};

use crate::error::ApiError;
use crate::server::AppState;

/// `POST /api/auth/register`
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<Json<ApiResponse<Value>>, ApiError> {
    req.validate()?;
    state.accounts.register(&req).await?;
    Ok(Json(ApiResponse::ok_with_message(
        Value::Null,
        "registration successful",
    )))
}

/// `POST /api/auth/login`
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<ApiResponse<Value>>, ApiError> {
    req.validate()?;
    let pair = state.accounts.login(&req).await?;
    Ok(Json(ApiResponse::ok_with_message(
        serde_json::to_value(pair).unwrap_or(Value::Null),
        "login successful",
    )))
}

/// `POST /api/auth/refresh`
pub async fn refresh(
    State(state): State<AppState>,
    Json(req): Json<RefreshRequest>,
) -> Result<Json<ApiResponse<Value>>, ApiError> {
    req.validate()?;
    let access_token = state.accounts.refresh(&req.refresh_token).await?;
    Ok(Json(ApiResponse::ok_with_message(
        json!({ "accessToken": access_token }),
        "token refreshed",
    )))
}

/// `POST /api/auth/reset-password`
pub async fn reset_password(
    State(state): State<AppState>,
    Json(req): Json<ResetPasswordRequest>,
) -> Result<Json<ApiResponse<Value>>, ApiError> {
    req.validate()?;
    state.accounts.reset_password(&req).await?;
    Ok(Json(ApiResponse::ok_with_message(
        Value::Null,
        "password reset successful",
    )))
}

/// `POST /api/auth/send-code`
pub async fn send_code(
    State(state): State<AppState>,
    Json(req): Json<SendCodeRequest>,
) -> Result<Json<ApiResponse<Value>>, ApiError> {
    req.validate()?;
    state.accounts.send_code(&req).await?;
    Ok(Json(ApiResponse::ok_with_message(
        Value::Null,
        "verification code sent",
    )))
}
