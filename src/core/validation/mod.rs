//! Validation and normalization of incoming records
//!
//! Payloads arrive as untyped JSON objects. The validators turn them into typed
//! drafts ([`NewOrder`](crate::core::record::NewOrder),
//! [`NewReview`](crate::core::record::NewReview)) or a [`Rejection`] naming the
//! rule that failed. Nothing here touches storage.

pub mod extractor;
pub mod records;
pub mod validators;

pub use extractor::JsonBody;
pub use records::{validate_order, validate_review};

/// Why a payload was refused
///
/// The `Display` text is returned to the client as-is, so it names the field
/// and the rule but nothing about the server.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Rejection {
    #[error("Missing required field: {field}")]
    MissingField { field: &'static str },

    #[error("Invalid {field}")]
    Invalid { field: &'static str },

    #[error("{field} must be between {min} and {max}")]
    OutOfRange {
        field: &'static str,
        min: i64,
        max: i64,
    },

    #[error("Invalid phone number")]
    InvalidPhoneNumber,

    #[error("Invalid email address")]
    InvalidEmail,
}
