//! Route table and layer stack

use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method, header},
    middleware,
    routing::{get, post},
};
use tower::ServiceBuilder;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use super::admin::{clear_all, list_all};
use super::handlers::{banner, create_record, dashboard, health, list_records, not_found};
use super::middleware::{enforce_rate_limit, handle_panic, security_header_layers};
use super::state::AppState;
use crate::core::{Order, Review};

/// Build the application router
///
/// Routes:
/// - GET /, GET /api/health, GET /dashboard
/// - GET /api/orders, GET /api/reviews (not rate limited)
/// - POST /api/orders, POST /api/reviews (rate limited)
/// - GET|DELETE /api/dashboard/orders, GET|DELETE /api/dashboard/reviews (rate limited)
///
/// Every response, fallback included, carries the security headers.
pub fn build_router(state: AppState) -> Router {
    let limited = middleware::from_fn_with_state(state.clone(), enforce_rate_limit);

    let mut app = Router::new()
        .route("/", get(banner))
        .route("/api/health", get(health))
        .route("/dashboard", get(dashboard))
        .route(
            "/api/orders",
            get(list_records::<Order>).merge(
                post(create_record::<Order>).route_layer(limited.clone()),
            ),
        )
        .route(
            "/api/reviews",
            get(list_records::<Review>).merge(
                post(create_record::<Review>).route_layer(limited.clone()),
            ),
        )
        .route(
            "/api/dashboard/orders",
            get(list_all::<Order>)
                .delete(clear_all::<Order>)
                .route_layer(limited.clone()),
        )
        .route(
            "/api/dashboard/reviews",
            get(list_all::<Review>)
                .delete(clear_all::<Review>)
                .route_layer(limited),
        )
        .fallback(not_found)
        .layer(DefaultBodyLimit::max(state.config.max_body_bytes))
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer(&state.config.allowed_origins)),
        );

    // Outermost, so panics, preflights and fallbacks get them too
    for layer in security_header_layers() {
        app = app.layer(layer);
    }

    app.with_state(state)
}

/// CORS policy from the configured origin list
pub fn cors_layer(origins: &[String]) -> CorsLayer {
    let allow_origin = if origins.iter().any(|o| o == "*") {
        AllowOrigin::any()
    } else {
        let parsed: Vec<HeaderValue> = origins
            .iter()
            .filter_map(|origin| match HeaderValue::from_str(origin) {
                Ok(value) => Some(value),
                Err(_) => {
                    tracing::warn!(%origin, "ignoring invalid CORS origin");
                    None
                }
            })
            .collect();
        AllowOrigin::list(parsed)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE])
}
