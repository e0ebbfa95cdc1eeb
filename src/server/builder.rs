//! ServerBuilder for fluent API to build HTTP servers

use super::router::build_router;
use super::state::AppState;
use crate::config::ServerConfig;
use crate::core::{Order, RateLimiter, RecordStore, Review, SlidingWindowLimiter};
use crate::storage::JsonFileStore;
use anyhow::Result;
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

/// Builder for the intake server
///
/// Stores and rate limiter default to the JSON file stores under
/// `config.data_dir` and an in-memory sliding-window limiter configured from
/// `config.rate_limit`; each can be replaced.
///
/// # Example
///
/// ```ignore
/// let app = ServerBuilder::new(ServerConfig::default())
///     .with_order_store(InMemoryStore::new())
///     .with_review_store(InMemoryStore::new())
///     .build()?;
/// ```
pub struct ServerBuilder {
    config: ServerConfig,
    orders: Option<Arc<dyn RecordStore<Order>>>,
    reviews: Option<Arc<dyn RecordStore<Review>>>,
    rate_limiter: Option<Arc<dyn RateLimiter>>,
}

impl ServerBuilder {
    /// Create a new ServerBuilder
    pub fn new(config: ServerConfig) -> Self {
        Self {
            config,
            orders: None,
            reviews: None,
            rate_limiter: None,
        }
    }

    /// Set the order store
    pub fn with_order_store(mut self, store: impl RecordStore<Order> + 'static) -> Self {
        self.orders = Some(Arc::new(store));
        self
    }

    /// Set the review store
    pub fn with_review_store(mut self, store: impl RecordStore<Review> + 'static) -> Self {
        self.reviews = Some(Arc::new(store));
        self
    }

    /// Set the rate limiter
    pub fn with_rate_limiter(mut self, limiter: impl RateLimiter + 'static) -> Self {
        self.rate_limiter = Some(Arc::new(limiter));
        self
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Build the shared application state
    pub fn build_state(self) -> AppState {
        let orders: Arc<dyn RecordStore<Order>> = match self.orders {
            Some(store) => store,
            None => Arc::new(JsonFileStore::<Order>::in_dir(&self.config.data_dir)),
        };
        let reviews: Arc<dyn RecordStore<Review>> = match self.reviews {
            Some(store) => store,
            None => Arc::new(JsonFileStore::<Review>::in_dir(&self.config.data_dir)),
        };
        let rate_limiter: Arc<dyn RateLimiter> = match self.rate_limiter {
            Some(limiter) => limiter,
            None => Arc::new(SlidingWindowLimiter::new(self.config.rate_limit.clone())),
        };

        AppState {
            orders,
            reviews,
            rate_limiter,
            config: Arc::new(self.config),
        }
    }

    /// Build the final router
    pub fn build(self) -> Router {
        build_router(self.build_state())
    }

    /// Serve the application with graceful shutdown
    ///
    /// This will:
    /// - Prepare both stores (data directory and empty files)
    /// - Start a sweep of idle rate-limit entries once per window
    /// - Bind to the configured address and serve with peer addresses
    /// - Handle SIGTERM and SIGINT (Ctrl+C) for graceful shutdown
    pub async fn serve(self) -> Result<()> {
        let addr = self.config.bind_addr()?;
        let sweep_every = self.config.rate_limit.window();
        let state = self.build_state();

        state.orders.prepare().await?;
        state.reviews.prepare().await?;

        let limiter = state.rate_limiter.clone();
        let sweeper = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(sweep_every.max(Duration::from_secs(1)));
            ticker.tick().await;
            loop {
                ticker.tick().await;
                match limiter.sweep().await {
                    Ok(0) => {}
                    Ok(removed) => tracing::debug!(removed, "swept idle rate limit entries"),
                    Err(e) => tracing::warn!(error = ?e, "rate limit sweep failed"),
                }
            }
        });

        let app = build_router(state);
        let listener = TcpListener::bind(addr).await?;

        tracing::info!("Server listening on http://{}", addr);
        tracing::info!("Orders API: http://{}/api/orders", addr);
        tracing::info!("Reviews API: http://{}/api/reviews", addr);
        tracing::info!("Health check: http://{}/api/health", addr);

        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown_signal())
        .await?;

        sweeper.abort();
        tracing::info!("Server shutdown complete");
        Ok(())
    }
}

/// Wait for Ctrl+C or SIGTERM
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal, initiating graceful shutdown...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM signal, initiating graceful shutdown...");
        },
    }
}
