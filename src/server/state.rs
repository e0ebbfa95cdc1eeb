//! Application state shared by every handler

use crate::config::ServerConfig;
use crate::core::{Order, RateLimiter, Record, RecordStore, Review};
use std::sync::Arc;

/// Everything a request needs, injected through axum's `State`
#[derive(Clone)]
pub struct AppState {
    pub orders: Arc<dyn RecordStore<Order>>,
    pub reviews: Arc<dyn RecordStore<Review>>,
    pub rate_limiter: Arc<dyn RateLimiter>,
    pub config: Arc<ServerConfig>,
}

/// Access to the store of one record kind
///
/// Lets the generic handlers pick the right collection out of [`AppState`].
pub trait StoreFor<T: Record> {
    fn store(&self) -> &Arc<dyn RecordStore<T>>;
}

impl StoreFor<Order> for AppState {
    fn store(&self) -> &Arc<dyn RecordStore<Order>> {
        &self.orders
    }
}

impl StoreFor<Review> for AppState {
    fn store(&self) -> &Arc<dyn RecordStore<Review>> {
        &self.reviews
    }
}
