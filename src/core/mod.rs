//! Core module containing the record model, validation, errors and the seams
//! (storage and rate limiting) the server is built on

pub mod error;
pub mod rate_limit;
pub mod record;
pub mod service;
pub mod validation;

pub use error::{ApiError, ErrorResponse};
pub use rate_limit::{RateLimitConfig, RateLimitDecision, RateLimiter, SlidingWindowLimiter};
pub use record::{NewOrder, NewReview, Order, Placement, Record, RecordKind, Review};
pub use service::RecordStore;
pub use validation::{JsonBody, Rejection};
