//! HTTP handlers for the public surface
//!
//! The record handlers are generic over [`Record`] and pick their collection
//! out of [`AppState`] through [`StoreFor`], so orders and reviews share one
//! pipeline: parse → validate → stamp and persist → respond.

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use super::state::{AppState, StoreFor};
use crate::core::{ApiError, JsonBody, Record};

const SERVICE_NAME: &str = "storefront-intake";

/// Success envelope for write endpoints
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuccessResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl SuccessResponse {
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
        }
    }
}

/// GET / - service banner
pub async fn banner() -> Json<Value> {
    Json(json!({
        "message": "Storefront Intake API",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// GET /api/health - liveness probe
pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": SERVICE_NAME
    }))
}

/// GET /dashboard - static admin page
pub async fn dashboard() -> Html<&'static str> {
    Html(include_str!("../../assets/dashboard.html"))
}

/// GET /api/{kind}s - the whole collection in stored order
pub async fn list_records<T>(State(state): State<AppState>) -> Result<Json<Vec<T>>, ApiError>
where
    T: Record,
    AppState: StoreFor<T>,
{
    let records = <AppState as StoreFor<T>>::store(&state)
        .list()
        .await
        .map_err(ApiError::Storage)?;
    Ok(Json(records))
}

/// POST /api/{kind}s - validate, stamp and persist a new record
///
/// Responds 201 with a success envelope; the collection itself is never echoed.
pub async fn create_record<T>(
    State(state): State<AppState>,
    JsonBody(body): JsonBody,
) -> Result<Response, ApiError>
where
    T: Record,
    AppState: StoreFor<T>,
{
    let kind = T::KIND;

    let draft = T::validate(&body).inspect_err(|rejection| {
        tracing::debug!(kind = kind.singular(), %rejection, "payload rejected");
    })?;

    let record = <AppState as StoreFor<T>>::store(&state)
        .insert(draft)
        .await
        .map_err(ApiError::Storage)?;

    tracing::info!(kind = kind.singular(), id = record.id(), "record created");

    Ok((
        StatusCode::CREATED,
        Json(SuccessResponse::message(format!(
            "{} created successfully",
            kind.label()
        ))),
    )
        .into_response())
}

/// Fallback for unknown paths
pub async fn not_found() -> ApiError {
    ApiError::NotFound
}
