//! End-to-end tests against a local mock upstream: token exchange, search,
//! detail lookup and retry behavior over real HTTP.

use base64::Engine;
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use catalog_client::{
    catalog_config, CatalogClient, CatalogConfig, CatalogError, ItemCondition, QuantityEstimate,
    RetryPolicy, SearchQuery,
};

const CLIENT_ID: &str = "test-client-id";
const CLIENT_SECRET: &str = "test-client-secret";

fn config_for(server: &MockServer) -> CatalogConfig {
    catalog_config()
        .client_id(CLIENT_ID)
        .client_secret(CLIENT_SECRET)
        .token_endpoint(format!("{}/identity/v1/oauth2/token", server.uri()))
        .api_base_url(format!("{}/buy/browse/v1", server.uri()))
        .retry(RetryPolicy {
            max_attempts: 3,
            initial_delay: Duration::from_millis(10),
            jitter: 0.0,
            ..RetryPolicy::default()
        })
        .build()
        .expect("test config must build")
}

fn expected_basic_auth() -> String {
    let raw = format!("{}:{}", CLIENT_ID, CLIENT_SECRET);
    format!(
        "Basic {}",
        base64::engine::general_purpose::STANDARD.encode(raw)
    )
}

async fn mount_token_endpoint(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/identity/v1/oauth2/token"))
        .and(header("authorization", expected_basic_auth().as_str()))
        .and(body_string_contains("grant_type=client_credentials"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "live-test-token",
            "expires_in": 7200,
            "token_type": "Bearer"
        })))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_search_and_detail_share_one_token_exchange() {
    let server = MockServer::start().await;
    mount_token_endpoint(&server).await;

    Mock::given(method("GET"))
        .and(path("/buy/browse/v1/item_summary/search"))
        .and(query_param("category_ids", "9355"))
        .and(query_param("fieldgroups", "EXTENDED"))
        .and(header("authorization", "Bearer live-test-token"))
        .and(header("x-ebay-c-marketplace-id", "EBAY_US"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "itemSummaries": [{
                "itemId": "v1-100-0",
                "title": "Phone",
                "price": {"value": "99.90", "currency": "USD"},
                "condition": "New",
                "seller": {"username": "shop"}
            }],
            "total": 1
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/buy/browse/v1/item/v1-100-0"))
        .and(header("authorization", "Bearer live-test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "itemId": "v1-100-0",
            "estimatedAvailabilities": [{"estimatedAvailableQuantity": 7}],
            "product": {"aspects": {"Brand": ["Acme"]}}
        })))
        .mount(&server)
        .await;

    let client = CatalogClient::new(config_for(&server)).expect("client must build");

    let page = client
        .search_by_category(
            &SearchQuery::by_category("9355")
                .condition(ItemCondition::New)
                .price_range(Some(15.0), None),
        )
        .await
        .expect("search must succeed");
    assert_eq!(page.total, 1);
    assert_eq!(page.items[0].price, Some(99.9));
    assert_eq!(page.items[0].seller, "shop");

    let detail = client
        .get_item_detail(&page.items[0].item_id, None)
        .await
        .expect("detail must succeed");
    assert_eq!(detail.quantity, QuantityEstimate::Exact(7));
    assert_eq!(detail.brand.as_deref(), Some("Acme"));

    // The token mock's expect(1) verifies both calls shared one exchange.
}

#[tokio::test]
async fn test_missing_item_maps_to_not_found() {
    let server = MockServer::start().await;
    mount_token_endpoint(&server).await;

    Mock::given(method("GET"))
        .and(path("/buy/browse/v1/item/v1-999-0"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "errors": [{"errorId": 11001, "message": "Item not found"}]
        })))
        .mount(&server)
        .await;

    let client = CatalogClient::new(config_for(&server)).expect("client must build");

    let result = client.get_item_detail("v1-999-0", None).await;
    match result {
        Err(CatalogError::NotFound { item_id }) => assert_eq!(item_id, "v1-999-0"),
        other => panic!("expected NotFound, got {:?}", other.err()),
    }
}

#[tokio::test]
async fn test_transient_server_error_is_retried() {
    let server = MockServer::start().await;
    mount_token_endpoint(&server).await;

    // First search attempt fails with a 503, the retry succeeds.
    Mock::given(method("GET"))
        .and(path("/buy/browse/v1/item_summary/search"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/buy/browse/v1/item_summary/search"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"itemSummaries": [], "total": 0})),
        )
        .mount(&server)
        .await;

    let client = CatalogClient::new(config_for(&server)).expect("client must build");

    let page = client
        .search_by_category(&SearchQuery::by_keyword("lego"))
        .await
        .expect("search must succeed after retry");
    assert_eq!(page.total, 0);
}

#[tokio::test]
async fn test_rejected_credentials_surface_as_auth_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/identity/v1/oauth2/token"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": "invalid_client"
        })))
        .mount(&server)
        .await;

    let client = CatalogClient::new(config_for(&server)).expect("client must build");

    let result = client
        .search_by_category(&SearchQuery::by_keyword("lego"))
        .await;
    assert!(matches!(result, Err(CatalogError::Auth(_))));
}
