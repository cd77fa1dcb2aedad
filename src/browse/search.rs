//! Search Client
//!
//! One-page catalog search with query validation and response
//! normalization. The client never auto-paginates: callers drive iteration
//! from the returned total-count hint.

use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use crate::browse::normalize;
use crate::core::{AuthMode, GatewayRequest, HttpGateway, HttpTransport};
use crate::error::{CatalogError, CatalogResult};
use crate::types::{ItemSummary, SearchPage, UNKNOWN_FIELD};

/// Page size bounds accepted by the upstream search endpoint.
const MIN_PAGE_SIZE: u32 = 1;
const MAX_PAGE_SIZE: u32 = 200;

/// Listing condition filter, translated to upstream condition identifiers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ItemCondition {
    New,
    Used,
    Refurbished,
}

impl ItemCondition {
    fn condition_ids(&self) -> &'static [u32] {
        match self {
            Self::New => &[1000],
            Self::Used => &[3000],
            Self::Refurbished => &[2000, 2010, 2020, 2030],
        }
    }
}

/// Search parameters. At least one of `category_ids`/`keyword` is required.
#[derive(Clone, Debug, Default)]
pub struct SearchQuery {
    pub category_ids: Vec<String>,
    pub keyword: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub condition: Option<ItemCondition>,
    pub sort: Option<String>,
    pub limit: u32,
    pub offset: u32,
    /// Overall budget for the call, covering retries and backoff.
    pub deadline: Option<Duration>,
}

impl SearchQuery {
    pub fn by_category(category_id: impl Into<String>) -> Self {
        Self {
            category_ids: vec![category_id.into()],
            limit: 50,
            ..Self::default()
        }
    }

    pub fn by_keyword(keyword: impl Into<String>) -> Self {
        Self {
            keyword: Some(keyword.into()),
            limit: 50,
            ..Self::default()
        }
    }

    pub fn condition(mut self, condition: ItemCondition) -> Self {
        self.condition = Some(condition);
        self
    }

    pub fn price_range(mut self, min: Option<f64>, max: Option<f64>) -> Self {
        self.min_price = min;
        self.max_price = max;
        self
    }

    pub fn sort(mut self, sort: impl Into<String>) -> Self {
        self.sort = Some(sort.into());
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }

    pub fn offset(mut self, offset: u32) -> Self {
        self.offset = offset;
        self
    }

    pub fn deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }
}

/// Client for the item-summary search endpoint.
pub struct SearchClient<T: HttpTransport> {
    gateway: Arc<HttpGateway<T>>,
    base_url: String,
    marketplace_id: String,
    currency: String,
}

impl<T: HttpTransport> SearchClient<T> {
    pub fn new(
        gateway: Arc<HttpGateway<T>>,
        base_url: impl Into<String>,
        marketplace_id: impl Into<String>,
        currency: impl Into<String>,
    ) -> Self {
        Self {
            gateway,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            marketplace_id: marketplace_id.into(),
            currency: currency.into(),
        }
    }

    /// Execute a one-page search.
    ///
    /// Fails with `InvalidQuery` before any network call when neither
    /// category nor keyword is given. The requested limit is clamped to the
    /// upstream page-size bounds; the effective value is echoed back on the
    /// returned page.
    pub async fn search(&self, query: &SearchQuery) -> CatalogResult<SearchPage> {
        if query.category_ids.is_empty() && query.keyword.is_none() {
            return Err(CatalogError::InvalidQuery {
                message: "search requires at least one of category_ids or keyword".to_string(),
            });
        }

        let limit = query.limit.clamp(MIN_PAGE_SIZE, MAX_PAGE_SIZE);
        let mut request = GatewayRequest::get(format!("{}/item_summary/search", self.base_url))
            .header("accept", "application/json")
            .header("x-ebay-c-marketplace-id", self.marketplace_id.clone());

        if let Some(keyword) = &query.keyword {
            request = request.query("q", keyword.clone());
        }
        if !query.category_ids.is_empty() {
            request = request.query("category_ids", query.category_ids.join(","));
        }
        request = request.query("filter", self.build_filter(query));
        request = request
            .query("limit", limit.to_string())
            .query("offset", query.offset.to_string());
        if let Some(sort) = &query.sort {
            request = request.query("sort", sort.clone());
        }
        request = request.query("fieldgroups", "EXTENDED");
        if let Some(deadline) = query.deadline {
            request = request.deadline(deadline);
        }

        let response = self.gateway.execute(request, AuthMode::Bearer).await?;
        let data: serde_json::Value = response.json().map_err(CatalogError::Request)?;

        let items: Vec<ItemSummary> = data
            .get("itemSummaries")
            .and_then(serde_json::Value::as_array)
            .map(|summaries| {
                summaries
                    .iter()
                    .map(|s| self.normalize_summary(s))
                    .collect()
            })
            .unwrap_or_default();

        let total = data
            .get("total")
            .and_then(serde_json::Value::as_u64)
            .unwrap_or(0);

        debug!(
            returned = items.len(),
            total,
            offset = query.offset,
            "search page fetched"
        );

        Ok(SearchPage {
            items,
            total,
            offset: query.offset,
            limit,
        })
    }

    /// Upstream `filter` expression. Fixed-price listings only; condition
    /// and price constraints are appended when present.
    fn build_filter(&self, query: &SearchQuery) -> String {
        let mut parts = vec!["buyingOptions:{FIXED_PRICE}".to_string()];

        if let Some(condition) = query.condition {
            let joined = condition
                .condition_ids()
                .iter()
                .map(u32::to_string)
                .collect::<Vec<_>>()
                .join("|");
            parts.push(format!("conditionIds:{{{}}}", joined));
        }

        match (query.min_price, query.max_price) {
            (None, None) => {}
            (min, max) => {
                let min = min.map(|v| v.to_string()).unwrap_or_default();
                let max = max.map(|v| v.to_string()).unwrap_or_default();
                parts.push(format!("price:[{}..{}]", min, max));
                parts.push(format!("priceCurrency:{}", self.currency));
            }
        }

        parts.join(",")
    }

    fn normalize_summary(&self, summary: &serde_json::Value) -> ItemSummary {
        let price = summary
            .get("price")
            .map(normalize::money_value)
            .unwrap_or(None);
        let currency = normalize::string_at(summary, "/price/currency")
            .unwrap_or_else(|| self.currency.clone());
        let shipping = summary
            .pointer("/shippingOptions/0/shippingCost")
            .and_then(|cost| normalize::money_value(cost));
        let total = price.map(|p| p + shipping.unwrap_or(0.0));

        ItemSummary {
            item_id: normalize::string_field(summary, "itemId")
                .unwrap_or_else(|| UNKNOWN_FIELD.to_string()),
            title: normalize::string_field(summary, "title")
                .unwrap_or_else(|| UNKNOWN_FIELD.to_string()),
            price,
            shipping,
            total,
            currency,
            condition: normalize::string_field(summary, "condition")
                .unwrap_or_else(|| UNKNOWN_FIELD.to_string()),
            condition_id: normalize::string_field(summary, "conditionId"),
            seller: normalize::string_at(summary, "/seller/username")
                .unwrap_or_else(|| UNKNOWN_FIELD.to_string()),
            quantity: normalize::extract_quantity(summary),
            category_id: normalize::string_field(summary, "categoryId"),
            item_url: normalize::string_field(summary, "itemWebUrl"),
            brand: normalize::string_field(summary, "brand"),
            mpn: normalize::string_field(summary, "mpn"),
            gtin: normalize::string_field(summary, "gtin"),
            raw: summary.clone(),
        }
    }
}
