//! Detail Client
//!
//! Single-item lookup used to enrich search results with live quantity and
//! product identifiers. A 404 maps to `NotFound`, which callers must treat
//! as semantic absence rather than a failure.

use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use crate::browse::normalize;
use crate::core::{AuthMode, GatewayRequest, HttpGateway, HttpTransport};
use crate::error::{CatalogError, CatalogResult, RequestError};
use crate::types::{ItemDetail, UNKNOWN_FIELD};

/// Field groups requested on the first attempt. Some listing types reject
/// them with a 400, in which case the lookup is repeated without them.
const DETAIL_FIELDGROUPS: &str = "PRODUCT,ADDITIONAL_SELLER_DETAILS";

/// Client for the single-item detail endpoint.
pub struct DetailClient<T: HttpTransport> {
    gateway: Arc<HttpGateway<T>>,
    base_url: String,
    marketplace_id: String,
}

impl<T: HttpTransport> DetailClient<T> {
    pub fn new(
        gateway: Arc<HttpGateway<T>>,
        base_url: impl Into<String>,
        marketplace_id: impl Into<String>,
    ) -> Self {
        Self {
            gateway,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            marketplace_id: marketplace_id.into(),
        }
    }

    /// Fetch and normalize one item.
    ///
    /// Fails with `NotFound` on a 404; all other gateway errors propagate
    /// unchanged.
    pub async fn get_detail(
        &self,
        item_id: &str,
        deadline: Option<Duration>,
    ) -> CatalogResult<ItemDetail> {
        let result = self
            .fetch(item_id, Some(DETAIL_FIELDGROUPS), deadline)
            .await;

        // Extended field groups are not valid for every listing type; a 400
        // on the first attempt is retried once without them.
        let data = match result {
            Err(CatalogError::Request(RequestError::HttpStatus { status: 400, .. })) => {
                debug!(item_id, "detail field groups rejected, retrying without");
                self.fetch(item_id, None, deadline).await?
            }
            other => other?,
        };

        Ok(self.normalize_detail(item_id, data))
    }

    async fn fetch(
        &self,
        item_id: &str,
        fieldgroups: Option<&str>,
        deadline: Option<Duration>,
    ) -> CatalogResult<serde_json::Value> {
        let url = format!("{}/item/{}", self.base_url, urlencoding::encode(item_id));
        let mut request = GatewayRequest::get(url)
            .header("accept", "application/json")
            .header("x-ebay-c-marketplace-id", self.marketplace_id.clone());
        if let Some(fieldgroups) = fieldgroups {
            request = request.query("fieldgroups", fieldgroups);
        }
        if let Some(deadline) = deadline {
            request = request.deadline(deadline);
        }

        let response = match self.gateway.execute(request, AuthMode::Bearer).await {
            Err(CatalogError::Request(RequestError::HttpStatus { status: 404, .. })) => {
                return Err(CatalogError::NotFound {
                    item_id: item_id.to_string(),
                });
            }
            other => other?,
        };

        response.json().map_err(CatalogError::Request)
    }

    fn normalize_detail(&self, requested_id: &str, data: serde_json::Value) -> ItemDetail {
        let brand = normalize::string_field(&data, "brand")
            .or_else(|| normalize::aspect_first(&data, "Brand"));
        let mpn = normalize::string_field(&data, "mpn")
            .or_else(|| normalize::aspect_first(&data, "MPN"))
            .or_else(|| normalize::aspect_first(&data, "Manufacturer Part Number"));
        let gtin = normalize::string_at(&data, "/product/gtin/0");

        ItemDetail {
            item_id: normalize::string_field(&data, "itemId")
                .unwrap_or_else(|| requested_id.to_string()),
            title: normalize::string_field(&data, "title"),
            condition: normalize::string_field(&data, "condition")
                .unwrap_or_else(|| UNKNOWN_FIELD.to_string()),
            seller: normalize::string_at(&data, "/seller/username")
                .unwrap_or_else(|| UNKNOWN_FIELD.to_string()),
            quantity: normalize::extract_quantity(&data),
            category_id: normalize::string_field(&data, "categoryId"),
            brand,
            mpn,
            gtin,
            raw: data,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::MockHttpTransport;
    use crate::resilience::{RecordingSleeper, RetryPolicy};
    use crate::token::MockTokenSource;
    use crate::types::QuantityEstimate;
    use serde_json::json;

    fn client(transport: Arc<MockHttpTransport>) -> DetailClient<MockHttpTransport> {
        let gateway = HttpGateway::new(
            transport,
            RetryPolicy {
                max_attempts: 2,
                jitter: 0.0,
                ..RetryPolicy::default()
            },
            Duration::from_secs(5),
        )
        .with_sleeper(Arc::new(RecordingSleeper::new()))
        .with_token_source(Arc::new(MockTokenSource::new()));
        DetailClient::new(
            Arc::new(gateway),
            "https://api.example.com/buy/browse/v1",
            "EBAY_US",
        )
    }

    #[tokio::test]
    async fn test_detail_normalizes_product_aspects() {
        let transport = Arc::new(MockHttpTransport::new());
        transport.queue_json(
            200,
            &json!({
                "itemId": "v1|123|0",
                "title": "Millennium Falcon",
                "condition": "New",
                "seller": {"username": "brickseller"},
                "categoryId": "19006",
                "estimatedAvailabilities": [{"estimatedAvailableQuantity": 5}],
                "product": {
                    "gtin": ["0673419265102"],
                    "aspects": {
                        "Brand": ["LEGO"],
                        "Manufacturer Part Number": ["75192"]
                    }
                }
            }),
        );
        let client = client(transport.clone());

        let detail = client.get_detail("v1|123|0", None).await.unwrap();

        assert_eq!(detail.item_id, "v1|123|0");
        assert_eq!(detail.quantity, QuantityEstimate::Exact(5));
        assert_eq!(detail.brand.as_deref(), Some("LEGO"));
        assert_eq!(detail.mpn.as_deref(), Some("75192"));
        assert_eq!(detail.gtin.as_deref(), Some("0673419265102"));

        let sent = transport.last_request().unwrap();
        assert!(sent.url.contains("/item/v1%7C123%7C0"));
        assert!(sent
            .url
            .contains("fieldgroups=PRODUCT%2CADDITIONAL_SELLER_DETAILS"));
    }

    #[tokio::test]
    async fn test_top_level_brand_wins_over_aspects() {
        let transport = Arc::new(MockHttpTransport::new());
        transport.queue_json(
            200,
            &json!({
                "itemId": "v1|123|0",
                "brand": "Hasbro",
                "product": {"aspects": {"Brand": ["LEGO"]}}
            }),
        );
        let client = client(transport);

        let detail = client.get_detail("v1|123|0", None).await.unwrap();
        assert_eq!(detail.brand.as_deref(), Some("Hasbro"));
    }

    #[tokio::test]
    async fn test_404_maps_to_not_found() {
        let transport = Arc::new(MockHttpTransport::new());
        transport.queue_status(404, r#"{"errors":[{"errorId":11001}]}"#);
        let client = client(transport.clone());

        let result = client.get_detail("v1|999|0", None).await;

        match result {
            Err(CatalogError::NotFound { item_id }) => assert_eq!(item_id, "v1|999|0"),
            other => panic!("expected NotFound, got {:?}", other.err()),
        }
        assert_eq!(transport.request_count(), 1);
    }

    #[tokio::test]
    async fn test_400_retries_once_without_fieldgroups() {
        let transport = Arc::new(MockHttpTransport::new());
        transport.queue_status(400, "invalid fieldgroups");
        transport.queue_json(200, &json!({"itemId": "v1|123|0"}));
        let client = client(transport.clone());

        let detail = client.get_detail("v1|123|0", None).await.unwrap();
        assert_eq!(detail.condition, UNKNOWN_FIELD);
        assert_eq!(detail.quantity, QuantityEstimate::Unknown);

        let requests = transport.requests();
        assert_eq!(requests.len(), 2);
        assert!(requests[0].url.contains("fieldgroups="));
        assert!(!requests[1].url.contains("fieldgroups="));
    }

    #[tokio::test]
    async fn test_other_errors_propagate_unchanged() {
        let transport = Arc::new(MockHttpTransport::new());
        transport.queue_status(500, "boom");
        transport.queue_status(500, "boom");
        let client = client(transport);

        let result = client.get_detail("v1|123|0", None).await;
        assert!(matches!(
            result,
            Err(CatalogError::Request(RequestError::RetriesExhausted { .. }))
        ));
    }
}
