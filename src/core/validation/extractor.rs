//! Axum extractor for JSON object bodies
//!
//! `JsonBody` wraps axum's `Json` extractor so that every body failure ends up
//! in the API's own error shape: oversized bodies become
//! [`ApiError::PayloadTooLarge`], anything else that is not a JSON object
//! becomes [`ApiError::MalformedRequest`].

use crate::core::error::ApiError;
use axum::{
    Json,
    extract::{FromRequest, Request},
    http::StatusCode,
};
use serde_json::{Map, Value};

/// A request body that parsed as a JSON object
#[derive(Debug, Clone)]
pub struct JsonBody(pub Map<String, Value>);

impl<S> FromRequest<S> for JsonBody
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<Value>::from_request(req, state).await {
            Ok(Json(Value::Object(map))) => Ok(JsonBody(map)),
            Ok(Json(other)) => {
                tracing::debug!(kind = json_kind(&other), "request body is not a JSON object");
                Err(ApiError::MalformedRequest)
            }
            Err(rejection) if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE => {
                tracing::debug!(%rejection, "request body over the size limit");
                Err(ApiError::PayloadTooLarge)
            }
            Err(rejection) => {
                tracing::debug!(%rejection, "request body rejected");
                Err(ApiError::MalformedRequest)
            }
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
