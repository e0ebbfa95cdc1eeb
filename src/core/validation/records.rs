//! Per-kind validation rules for orders and reviews

use super::Rejection;
use super::validators::{
    digit_count, integer_in_range, optional_text, require_all, required, text, truncate,
};
use crate::core::record::{NewOrder, NewReview};
use serde_json::{Map, Value};

pub const FULL_NAME_MAX: usize = 100;
pub const PHONE_NUMBER_MAX: usize = 20;
pub const PHONE_DIGITS_MIN: usize = 10;
pub const FACEBOOK_MAX: usize = 100;
pub const QUANTITY_RANGE: (i64, i64) = (1, 100);

pub const REVIEW_NAME_MAX: usize = 50;
pub const EMAIL_MIN: usize = 5;
pub const COMMENT_MAX: usize = 500;
pub const RATING_RANGE: (i64, i64) = (1, 5);

/// Validate and normalize an order payload
///
/// `id` and `createdAt` in the payload are ignored, as is any field the order
/// does not define. `pickupDate` and `total` pass through untouched.
pub fn validate_order(input: &Map<String, Value>) -> Result<NewOrder, Rejection> {
    require_all(input, &["fullName", "phoneNumber", "quantity"])?;

    let (min, max) = QUANTITY_RANGE;
    let quantity = integer_in_range(required(input, "quantity")?, "quantity", min, max)?;

    let phone_number = text(required(input, "phoneNumber")?, "phoneNumber")?;
    if digit_count(&phone_number) < PHONE_DIGITS_MIN {
        return Err(Rejection::InvalidPhoneNumber);
    }

    let full_name = text(required(input, "fullName")?, "fullName")?;

    Ok(NewOrder {
        full_name: truncate(&full_name, FULL_NAME_MAX),
        phone_number: truncate(&phone_number, PHONE_NUMBER_MAX),
        facebook: optional_text(input, "facebook", FACEBOOK_MAX)?,
        quantity: quantity as u32,
        pickup_date: passthrough(input, "pickupDate"),
        total: passthrough(input, "total"),
    })
}

/// Validate and normalize a review payload
///
/// `id` and `date` in the payload are ignored.
pub fn validate_review(input: &Map<String, Value>) -> Result<NewReview, Rejection> {
    require_all(
        input,
        &["name", "email", "comment", "productRating", "serviceRating"],
    )?;

    let email = text(required(input, "email")?, "email")?;
    let email = email.trim();
    if !email.contains('@') || email.chars().count() < EMAIL_MIN {
        return Err(Rejection::InvalidEmail);
    }

    let (min, max) = RATING_RANGE;
    let product_rating =
        integer_in_range(required(input, "productRating")?, "productRating", min, max)?;
    let service_rating =
        integer_in_range(required(input, "serviceRating")?, "serviceRating", min, max)?;

    let name = text(required(input, "name")?, "name")?;
    let comment = text(required(input, "comment")?, "comment")?;

    Ok(NewReview {
        name: truncate(&name, REVIEW_NAME_MAX),
        email: email.to_string(),
        comment: truncate(&comment, COMMENT_MAX),
        product_rating: product_rating as u8,
        service_rating: service_rating as u8,
    })
}

fn passthrough(input: &Map<String, Value>, field: &str) -> Option<Value> {
    input.get(field).filter(|value| !value.is_null()).cloned()
}
