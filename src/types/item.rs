//! Normalized Item Records
//!
//! Stable schema produced from heterogeneous upstream search and detail
//! responses. Fields absent upstream are populated with explicit sentinels,
//! never dropped, since downstream persistence depends on consistent shape.

use serde::Serialize;

/// Sentinel for string fields the upstream response did not provide.
pub const UNKNOWN_FIELD: &str = "UNKNOWN";

/// Live quantity estimate for a listing.
///
/// Callers must treat `Unknown` as "no information", never as zero.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum QuantityEstimate {
    Exact(u32),
    Unknown,
}

impl QuantityEstimate {
    /// Quantity as an option, `None` for unknown.
    pub fn as_option(&self) -> Option<u32> {
        match self {
            Self::Exact(q) => Some(*q),
            Self::Unknown => None,
        }
    }
}

/// Normalized search result record.
#[derive(Clone, Debug, Serialize)]
pub struct ItemSummary {
    pub item_id: String,
    pub title: String,
    pub price: Option<f64>,
    /// Cost of the first listed shipping option.
    pub shipping: Option<f64>,
    /// Landed total: item price plus shipping (shipping counted as zero when
    /// absent). `None` when the price itself is unknown.
    pub total: Option<f64>,
    pub currency: String,
    /// Listing condition, `UNKNOWN_FIELD` when absent upstream.
    pub condition: String,
    /// Upstream numeric condition identifier, when reported.
    pub condition_id: Option<String>,
    /// Seller username, `UNKNOWN_FIELD` when absent upstream.
    pub seller: String,
    pub quantity: QuantityEstimate,
    pub category_id: Option<String>,
    pub item_url: Option<String>,
    pub brand: Option<String>,
    pub mpn: Option<String>,
    pub gtin: Option<String>,
    /// Untouched upstream record, for fields the stable schema omits.
    pub raw: serde_json::Value,
}

/// One page of normalized search results.
///
/// The client never auto-paginates; the total-count hint, offset and limit
/// let the caller drive iteration.
#[derive(Clone, Debug, Serialize)]
pub struct SearchPage {
    pub items: Vec<ItemSummary>,
    /// Upstream total-count hint for the whole result set.
    pub total: u64,
    pub offset: u32,
    pub limit: u32,
}

/// Normalized single-item detail record.
#[derive(Clone, Debug, Serialize)]
pub struct ItemDetail {
    pub item_id: String,
    pub title: Option<String>,
    pub condition: String,
    pub seller: String,
    pub quantity: QuantityEstimate,
    pub category_id: Option<String>,
    pub brand: Option<String>,
    pub mpn: Option<String>,
    pub gtin: Option<String>,
    pub raw: serde_json::Value,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quantity_as_option() {
        assert_eq!(QuantityEstimate::Exact(7).as_option(), Some(7));
        assert_eq!(QuantityEstimate::Unknown.as_option(), None);
    }

    #[test]
    fn test_unknown_quantity_is_not_zero() {
        assert_ne!(QuantityEstimate::Unknown, QuantityEstimate::Exact(0));
    }
}
