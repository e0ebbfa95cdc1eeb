//! Typed error handling at the HTTP boundary
//!
//! Every handler returns `Result<_, ApiError>`. The error decides the status
//! code, a stable error code used in logs, and the message the client sees.
//! Storage and internal failures are logged here with their full cause chain
//! and answered with a generic message.
//!
//! # Error Categories
//!
//! - [`ApiError::MalformedRequest`]: body missing or not a JSON object
//! - [`ApiError::Validation`]: a field failed a rule ([`Rejection`])
//! - [`ApiError::PayloadTooLarge`]: body over the configured limit
//! - [`ApiError::RateLimited`]: sliding-window ceiling reached
//! - [`ApiError::NotFound`]: no route for the path
//! - [`ApiError::Storage`] / [`ApiError::Internal`]: everything unexpected
//!
//! # Example
//!
//! ```rust,ignore
//! async fn create(JsonBody(body): JsonBody) -> Result<Response, ApiError> {
//!     let draft = validate_order(&body)?;
//!     let order = store.insert(draft).await.map_err(ApiError::Storage)?;
//!     Ok(created(order))
//! }
//! ```

use crate::core::validation::Rejection;
use axum::Json;
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// The error type returned by every request handler
#[derive(Debug)]
pub enum ApiError {
    /// Body missing, not JSON, or not a JSON object
    MalformedRequest,

    /// A field failed validation
    Validation(Rejection),

    /// Body larger than the configured limit
    PayloadTooLarge,

    /// Too many requests from this client within the window
    RateLimited { retry_after: Duration },

    /// No route matched
    NotFound,

    /// Reading or writing a collection failed
    Storage(anyhow::Error),

    /// Anything else (including caught panics)
    Internal(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::MalformedRequest => write!(f, "Invalid request body"),
            ApiError::Validation(rejection) => write!(f, "{}", rejection),
            ApiError::PayloadTooLarge => write!(f, "Request body too large"),
            ApiError::RateLimited { .. } => {
                write!(f, "Too many requests, please try again later")
            }
            ApiError::NotFound => write!(f, "Not found"),
            ApiError::Storage(_) | ApiError::Internal(_) => write!(f, "Internal server error"),
        }
    }
}

impl std::error::Error for ApiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ApiError::Validation(rejection) => Some(rejection),
            ApiError::Storage(err) => Some(&**err),
            _ => None,
        }
    }
}

impl From<Rejection> for ApiError {
    fn from(rejection: Rejection) -> Self {
        ApiError::Validation(rejection)
    }
}

/// Error response body: `{"success": false, "error": "..."}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
}

impl ApiError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::MalformedRequest => StatusCode::BAD_REQUEST,
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::MalformedRequest => "MALFORMED_REQUEST",
            ApiError::Validation(_) => "VALIDATION_FAILED",
            ApiError::PayloadTooLarge => "PAYLOAD_TOO_LARGE",
            ApiError::RateLimited { .. } => "RATE_LIMITED",
            ApiError::NotFound => "NOT_FOUND",
            ApiError::Storage(_) => "STORAGE_ERROR",
            ApiError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Convert to an error response body
    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            success: false,
            error: self.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            ApiError::Storage(err) => {
                tracing::error!(code = self.error_code(), error = ?err, "storage failure");
            }
            ApiError::Internal(detail) => {
                tracing::error!(code = self.error_code(), %detail, "internal failure");
            }
            _ => {}
        }

        let status = self.status_code();
        let mut response = (status, Json(self.to_response())).into_response();

        if let ApiError::RateLimited { retry_after } = &self {
            let secs = retry_after.as_secs() + u64::from(retry_after.subsec_nanos() > 0);
            if let Ok(value) = HeaderValue::from_str(&secs.max(1).to_string()) {
                response.headers_mut().insert(header::RETRY_AFTER, value);
            }
        }

        response
    }
}
