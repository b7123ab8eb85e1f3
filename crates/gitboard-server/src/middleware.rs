use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::{HeaderName, HeaderValue, StatusCode, header::AUTHORIZATION};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use uuid::Uuid;

use gitboard_auth::TokenService;
use gitboard_core::ApiResponse;

// =============================================================================
// Authentication middleware
// =============================================================================

/// Bearer-token authentication for protected routes.
///
/// Validates the `Authorization` header, and on success stores the decoded
/// `Claims` in request extensions for downstream handlers. Failure modes map
/// to the three documented 401 messages.
pub async fn require_auth(
    State(tokens): State<Arc<TokenService>>,
    mut req: Request,
    next: Next,
) -> Response {
    let header = match req.headers().get(AUTHORIZATION).and_then(|h| h.to_str().ok()) {
        Some(header) => header,
        None => {
            tracing::debug!(path = %req.uri().path(), "no Authorization header");
            return unauthorized("no token supplied");
        }
    };

    let token = match header.strip_prefix("Bearer ") {
        Some(t) if !t.is_empty() => t,
        _ => return unauthorized("malformed token"),
    };

    match tokens.verify_access(token) {
        Ok(claims) => {
            req.extensions_mut().insert(claims);
            next.run(req).await
        }
        Err(e) => {
            tracing::debug!(error = %e, "access token rejected");
            unauthorized("token invalid or expired")
        }
    }
}

fn unauthorized(message: &str) -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(ApiResponse::<()>::error(401, message)),
    )
        .into_response()
}

// =============================================================================
// Request id middleware
// =============================================================================

// Ensures each request has an X-Request-Id and mirrors it on the response.
pub async fn request_id(mut req: Request, next: Next) -> Response {
    let header_name = HeaderName::from_static("x-request-id");

    // Preserve an incoming request id; otherwise generate one.
    let req_id_value = req
        .headers()
        .get(&header_name)
        .cloned()
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| {
            HeaderValue::from_str(&Uuid::new_v4().to_string())
                .unwrap_or_else(|_| HeaderValue::from_static("unknown"))
        });

    req.extensions_mut().insert(req_id_value.clone());

    let mut res = next.run(req).await;
    res.headers_mut().insert(header_name, req_id_value);
    res
}
