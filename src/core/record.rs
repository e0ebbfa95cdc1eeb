//! Record types persisted by the intake API
//!
//! A record starts life as a *draft* produced by validation ([`NewOrder`],
//! [`NewReview`]) and becomes a persisted record ([`Order`], [`Review`]) once
//! the store stamps it with an id and a creation time. Records are never
//! modified after that.

use crate::core::validation::{Rejection, validate_order, validate_review};
use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};
use serde::de::{self, DeserializeOwned};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::fmt::Debug;

/// Where a new record goes in its collection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// At the end (oldest first)
    Append,
    /// At the front (newest first)
    Prepend,
}

impl Placement {
    pub fn place<T>(self, records: &mut Vec<T>, record: T) {
        match self {
            Placement::Append => records.push(record),
            Placement::Prepend => records.insert(0, record),
        }
    }
}

/// The two collections the API manages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    Order,
    Review,
}

impl RecordKind {
    /// Singular form (e.g., "order")
    pub fn singular(self) -> &'static str {
        match self {
            RecordKind::Order => "order",
            RecordKind::Review => "review",
        }
    }

    /// Plural form (e.g., "orders")
    pub fn plural(self) -> &'static str {
        match self {
            RecordKind::Order => "orders",
            RecordKind::Review => "reviews",
        }
    }

    /// Capitalized label used in response messages
    pub fn label(self) -> &'static str {
        match self {
            RecordKind::Order => "Order",
            RecordKind::Review => "Review",
        }
    }

    /// File name of the backing JSON document
    pub fn file_name(self) -> &'static str {
        match self {
            RecordKind::Order => "orders.json",
            RecordKind::Review => "reviews.json",
        }
    }

    pub fn placement(self) -> Placement {
        match self {
            RecordKind::Order => Placement::Append,
            RecordKind::Review => Placement::Prepend,
        }
    }
}

/// A persisted record kind
///
/// Ties together the draft type, the validator producing it, and the stamping
/// step that turns a draft into a stored record.
pub trait Record: Serialize + DeserializeOwned + Clone + Debug + Send + Sync + 'static {
    /// Validated, normalized input without server-assigned fields
    type Draft: Clone + Debug + Send + Sync + 'static;

    const KIND: RecordKind;

    /// Validate an untyped payload into a draft
    fn validate(input: &Map<String, Value>) -> Result<Self::Draft, Rejection>;

    /// Build the stored record, assigning identity and creation time
    fn stamp(draft: Self::Draft, id: u64, now: DateTime<Utc>) -> Self;

    fn id(&self) -> u64;
}

// =============================================================================
// Orders
// =============================================================================

/// A validated order waiting to be stored
#[derive(Debug, Clone, PartialEq)]
pub struct NewOrder {
    pub full_name: String,
    pub phone_number: String,
    pub facebook: Option<String>,
    pub quantity: u32,
    pub pickup_date: Option<Value>,
    pub total: Option<Value>,
}

/// Parse a stored creation timestamp
///
/// RFC 3339 first; a date-time without an offset (`2024-05-01T10:00:00.123456`)
/// is read as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
                .iter()
                .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
                .map(|naive| naive.and_utc())
        })
}

fn lenient_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw)
        .ok_or_else(|| de::Error::custom(format!("invalid timestamp '{}'", raw)))
}

/// A stored order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: u64,
    #[serde(deserialize_with = "lenient_timestamp")]
    pub created_at: DateTime<Utc>,
    pub full_name: String,
    pub phone_number: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub facebook: Option<String>,
    pub quantity: u32,
    /// Opaque, consumed by the dashboard only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pickup_date: Option<Value>,
    /// Opaque, consumed by the dashboard only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<Value>,
}

impl Record for Order {
    type Draft = NewOrder;

    const KIND: RecordKind = RecordKind::Order;

    fn validate(input: &Map<String, Value>) -> Result<NewOrder, Rejection> {
        validate_order(input)
    }

    fn stamp(draft: NewOrder, id: u64, now: DateTime<Utc>) -> Self {
        Self {
            id,
            created_at: now,
            full_name: draft.full_name,
            phone_number: draft.phone_number,
            facebook: draft.facebook,
            quantity: draft.quantity,
            pickup_date: draft.pickup_date,
            total: draft.total,
        }
    }

    fn id(&self) -> u64 {
        self.id
    }
}

// =============================================================================
// Reviews
// =============================================================================

/// A validated review waiting to be stored
#[derive(Debug, Clone, PartialEq)]
pub struct NewReview {
    pub name: String,
    pub email: String,
    pub comment: String,
    pub product_rating: u8,
    pub service_rating: u8,
}

/// Review date as `MM/DD/YYYY` in the timezone of `at`
pub fn review_date<Tz>(at: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    at.format("%m/%d/%Y").to_string()
}

/// A stored review
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: u64,
    /// Server local date, MM/DD/YYYY
    pub date: String,
    pub name: String,
    pub email: String,
    pub comment: String,
    pub product_rating: u8,
    pub service_rating: u8,
}

impl Record for Review {
    type Draft = NewReview;

    const KIND: RecordKind = RecordKind::Review;

    fn validate(input: &Map<String, Value>) -> Result<NewReview, Rejection> {
        validate_review(input)
    }

    fn stamp(draft: NewReview, id: u64, now: DateTime<Utc>) -> Self {
        Self {
            id,
            date: review_date(&now.with_timezone(&Local)),
            name: draft.name,
            email: draft.email,
            comment: draft.comment,
            product_rating: draft.product_rating,
            service_rating: draft.service_rating,
        }
    }

    fn id(&self) -> u64 {
        self.id
    }
}
