//! Request middleware: rate limiting, panic recovery, security headers

use axum::{
    extract::{ConnectInfo, Request, State},
    http::{HeaderName, HeaderValue, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::any::Any;
use std::net::SocketAddr;
use tower_http::set_header::SetResponseHeaderLayer;

use super::state::AppState;
use crate::core::ApiError;

/// Key used when the server runs without connection info
pub const UNKNOWN_CLIENT: &str = "unknown";

/// Client key for rate limiting: the peer IP address
pub fn client_key(request: &Request) -> String {
    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| UNKNOWN_CLIENT.to_string())
}

/// Reject with 429 once the client exceeds its sliding-window budget
///
/// A failing limiter backend lets the request through.
pub async fn enforce_rate_limit(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let key = client_key(&request);

    match state.rate_limiter.check(&key).await {
        Ok(decision) if decision.allowed => next.run(request).await,
        Ok(decision) => {
            tracing::warn!(
                client = %key,
                path = %request.uri().path(),
                retry_after_ms = decision.retry_after.as_millis() as u64,
                "rate limit exceeded"
            );
            ApiError::RateLimited {
                retry_after: decision.retry_after,
            }
            .into_response()
        }
        Err(e) => {
            tracing::error!(client = %key, error = ?e, "rate limiter unavailable, admitting request");
            next.run(request).await
        }
    }
}

/// Turn a handler panic into the generic 500 response
pub fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };

    ApiError::Internal(detail).into_response()
}

/// Headers set on every response
pub fn security_headers() -> Vec<(HeaderName, HeaderValue)> {
    vec![
        (
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ),
        (header::X_FRAME_OPTIONS, HeaderValue::from_static("DENY")),
        (
            header::X_XSS_PROTECTION,
            HeaderValue::from_static("1; mode=block"),
        ),
        (
            header::STRICT_TRANSPORT_SECURITY,
            HeaderValue::from_static("max-age=31536000; includeSubDomains"),
        ),
    ]
}

pub fn security_header_layers() -> Vec<SetResponseHeaderLayer<HeaderValue>> {
    security_headers()
        .into_iter()
        .map(|(name, value)| SetResponseHeaderLayer::overriding(name, value))
        .collect()
}
