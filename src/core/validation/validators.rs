//! Reusable field validators
//!
//! Each helper reads one field out of an untyped JSON object and either
//! returns the coerced value or the [`Rejection`] describing what is wrong.

use super::Rejection;
use regex::Regex;
use serde_json::{Map, Value};
use std::sync::OnceLock;

/// Stringified form of a value used for the presence check.
///
/// Strings are taken as-is, numbers and booleans by their JSON text. Arrays and
/// objects count as present; the typed accessors reject them afterwards.
fn presence_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Array(_) | Value::Object(_) => Some(value.to_string()),
    }
}

/// Validator: field exists, is not null and is not blank once stringified
pub fn required<'a>(input: &'a Map<String, Value>, field: &'static str) -> Result<&'a Value, Rejection> {
    input
        .get(field)
        .filter(|value| presence_text(value).is_some_and(|s| !s.trim().is_empty()))
        .ok_or(Rejection::MissingField { field })
}

/// Validator: every listed field passes [`required`], checked in order
pub fn require_all(input: &Map<String, Value>, fields: &[&'static str]) -> Result<(), Rejection> {
    fields
        .iter()
        .try_for_each(|field| required(input, field).map(|_| ()))
}

/// Coerce a scalar into text
pub fn text(value: &Value, field: &'static str) -> Result<String, Rejection> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        _ => Err(Rejection::Invalid { field }),
    }
}

/// Optional text field: absent, null or blank values yield `None`
pub fn optional_text(
    input: &Map<String, Value>,
    field: &'static str,
    max_chars: usize,
) -> Result<Option<String>, Rejection> {
    match input.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => {
            let normalized = truncate(&text(value, field)?, max_chars);
            Ok((!normalized.is_empty()).then_some(normalized))
        }
    }
}

/// Trim, cut to `max_chars` characters, trim again
pub fn truncate(raw: &str, max_chars: usize) -> String {
    let cut: String = raw.trim().chars().take(max_chars).collect();
    cut.trim_end().to_string()
}

/// Parse an integer and check it against an inclusive range
///
/// Accepts JSON integers, floats with no fractional part, and numeric strings.
pub fn integer_in_range(
    value: &Value,
    field: &'static str,
    min: i64,
    max: i64,
) -> Result<i64, Rejection> {
    let parsed = match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64)
                .map(|f| f as i64)
        }),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
    .ok_or(Rejection::Invalid { field })?;

    if (min..=max).contains(&parsed) {
        Ok(parsed)
    } else {
        Err(Rejection::OutOfRange { field, min, max })
    }
}

/// Number of digits left once every non-digit character is removed
pub fn digit_count(raw: &str) -> usize {
    static NON_DIGIT: OnceLock<Regex> = OnceLock::new();
    let regex = NON_DIGIT.get_or_init(|| Regex::new(r"[^0-9]").unwrap());
    regex.replace_all(raw, "").len()
}
