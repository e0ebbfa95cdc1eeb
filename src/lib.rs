//! # Storefront Intake
//!
//! A small HTTP service that accepts customer orders and reviews from a
//! storefront, validates and sanitizes them, and keeps each collection in a
//! flat JSON file.
//!
//! ## Features
//!
//! - **Validation**: required fields, length caps, numeric ranges and phone/email checks
//! - **Flat-file storage**: one pretty-printed JSON array per collection, written atomically
//! - **Rate limiting**: sliding window per client IP on write and admin routes
//! - **Admin endpoints**: list and clear each collection, plus a static dashboard page
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use intake::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ServerConfig::load()?;
//!     ServerBuilder::new(config).serve().await
//! }
//! ```

pub mod config;
pub mod core;
pub mod server;
pub mod storage;

/// Re-exports of commonly used types and traits
pub mod prelude {
    pub use crate::config::ServerConfig;
    pub use crate::core::{
        ApiError, ErrorResponse, NewOrder, NewReview, Order, RateLimitConfig, RateLimitDecision,
        RateLimiter, Record, RecordKind, RecordStore, Rejection, Review, SlidingWindowLimiter,
    };
    pub use crate::server::{AppState, ServerBuilder, build_router};
    pub use crate::storage::{InMemoryStore, JsonFileStore};

    pub use anyhow::Result;
    pub use async_trait::async_trait;
    pub use serde::{Deserialize, Serialize};
}
