//! Admin handlers: list-all and delete-all per collection
//!
//! Meant for trusted operators; there is no authentication, only the rate
//! limiter in front of these routes.

use axum::{Json, extract::State};

use super::handlers::SuccessResponse;
use super::state::{AppState, StoreFor};
use crate::core::{ApiError, Record};

/// GET /api/dashboard/{kind}s
pub async fn list_all<T>(State(state): State<AppState>) -> Result<Json<Vec<T>>, ApiError>
where
    T: Record,
    AppState: StoreFor<T>,
{
    let records = <AppState as StoreFor<T>>::store(&state)
        .list()
        .await
        .map_err(ApiError::Storage)?;

    tracing::debug!(kind = T::KIND.plural(), count = records.len(), "admin listed collection");
    Ok(Json(records))
}

/// DELETE /api/dashboard/{kind}s
pub async fn clear_all<T>(State(state): State<AppState>) -> Result<Json<SuccessResponse>, ApiError>
where
    T: Record,
    AppState: StoreFor<T>,
{
    let removed = <AppState as StoreFor<T>>::store(&state)
        .clear()
        .await
        .map_err(ApiError::Storage)?;

    tracing::info!(kind = T::KIND.plural(), removed, "admin cleared collection");
    Ok(Json(SuccessResponse::message(format!(
        "Cleared {} {}",
        removed,
        T::KIND.plural()
    ))))
}
