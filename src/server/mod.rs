//! HTTP server: routes, handlers, middleware and the builder that wires them
//!
//! The public surface is the two intake collections (`/api/orders`,
//! `/api/reviews`), the admin dashboard endpoints and a couple of probes.

pub mod admin;
pub mod builder;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use builder::ServerBuilder;
pub use router::build_router;
pub use state::{AppState, StoreFor};
