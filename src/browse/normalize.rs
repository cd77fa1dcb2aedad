//! Field extraction helpers shared by the search and detail normalizers.
//!
//! Upstream records are loosely shaped: money values arrive as strings or
//! numbers, quantity lives in one of two places, and product attributes may
//! sit at the top level or inside `product.aspects`. Everything here returns
//! `Option`/sentinel-friendly values and never fails.

use serde_json::Value;

use crate::types::QuantityEstimate;

/// Parse a `{value, currency}` money object. The value arrives as a JSON
/// string on some endpoints and a number on others.
pub(crate) fn money_value(money: &Value) -> Option<f64> {
    match money.get("value") {
        Some(Value::String(s)) => s.parse().ok(),
        Some(Value::Number(n)) => n.as_f64(),
        _ => None,
    }
}

/// Owned string at a field, `None` when absent or not a string.
pub(crate) fn string_field(value: &Value, field: &str) -> Option<String> {
    value.get(field).and_then(Value::as_str).map(str::to_string)
}

/// Nested string lookup via JSON pointer.
pub(crate) fn string_at(value: &Value, pointer: &str) -> Option<String> {
    value.pointer(pointer).and_then(Value::as_str).map(str::to_string)
}

/// Live quantity, probing `estimatedAvailabilities` first and falling back
/// to `availability.shipToLocationAvailability.quantity`.
pub(crate) fn extract_quantity(value: &Value) -> QuantityEstimate {
    let estimated = value
        .pointer("/estimatedAvailabilities/0/estimatedAvailableQuantity")
        .and_then(Value::as_u64);
    let fallback = || {
        value
            .pointer("/availability/shipToLocationAvailability/quantity")
            .and_then(Value::as_u64)
    };

    match estimated.or_else(fallback) {
        Some(q) => u32::try_from(q).map_or(QuantityEstimate::Unknown, QuantityEstimate::Exact),
        None => QuantityEstimate::Unknown,
    }
}

/// First value of a named product aspect, e.g. `Brand` or `MPN`.
pub(crate) fn aspect_first(value: &Value, aspect: &str) -> Option<String> {
    value
        .pointer("/product/aspects")
        .and_then(|aspects| aspects.get(aspect))
        .and_then(|values| values.get(0))
        .and_then(Value::as_str)
        .map(str::to_string)
}
