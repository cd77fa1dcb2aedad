//! Catalog Client Facade
//!
//! Thin composition over the token manager, gateway and browse clients.
//! External callers depend only on this type; it owns the single token
//! manager / gateway pair for the process and is safe to share across tasks.

use std::sync::Arc;
use std::time::Duration;

use crate::browse::{DetailClient, SearchClient, SearchQuery};
use crate::cache::{CacheStore, DegradeGate, InMemoryCacheStore};
use crate::core::{HttpGateway, HttpTransport, ReqwestHttpTransport};
use crate::error::CatalogResult;
use crate::token::{ClientCredentialsTokenManager, TokenSource};
use crate::types::{CatalogConfig, ItemDetail, SearchPage};

/// Catalog API facade.
pub struct CatalogClient<T: HttpTransport, C: CacheStore> {
    config: CatalogConfig,
    search: SearchClient<T>,
    detail: DetailClient<T>,
    tokens: Arc<ClientCredentialsTokenManager<T, DegradeGate<C>>>,
}

impl CatalogClient<ReqwestHttpTransport, InMemoryCacheStore> {
    /// Create a client with the production transport and an in-memory
    /// token/payload cache.
    pub fn new(config: CatalogConfig) -> CatalogResult<Self> {
        let transport = Arc::new(ReqwestHttpTransport::new(config.timeout)?);
        Ok(Self::with_components(
            config,
            transport,
            InMemoryCacheStore::new(),
        ))
    }
}

impl<T: HttpTransport + 'static, C: CacheStore + 'static> CatalogClient<T, C> {
    /// Create a client over caller-supplied transport and cache backend.
    ///
    /// The cache is wrapped in a degrade gate: a faulting backend is left
    /// alone for `config.cache_cooldown` before being re-probed.
    pub fn with_components(config: CatalogConfig, transport: Arc<T>, cache: C) -> Self {
        let cache = Arc::new(DegradeGate::new(cache, config.cache_cooldown));

        // The token exchange goes through its own unauthenticated gateway:
        // it authenticates with HTTP Basic, not a bearer token.
        let token_gateway =
            HttpGateway::new(transport.clone(), config.retry.clone(), config.timeout);
        let tokens = Arc::new(ClientCredentialsTokenManager::new(
            config.credentials.clone(),
            config.endpoints.token_endpoint.clone(),
            config.scope.clone(),
            config.token_safety_margin,
            config.refresh_policy,
            token_gateway,
            cache,
        ));

        let gateway = Arc::new(
            HttpGateway::new(transport, config.retry.clone(), config.timeout)
                .with_token_source(tokens.clone() as Arc<dyn TokenSource>),
        );

        let search = SearchClient::new(
            gateway.clone(),
            config.endpoints.api_base_url.clone(),
            config.marketplace_id.clone(),
            config.currency.clone(),
        );
        let detail = DetailClient::new(
            gateway,
            config.endpoints.api_base_url.clone(),
            config.marketplace_id.clone(),
        );

        Self {
            config,
            search,
            detail,
            tokens,
        }
    }

    /// Search one page of listings. See [`SearchQuery`] for parameters.
    pub async fn search_by_category(&self, query: &SearchQuery) -> CatalogResult<SearchPage> {
        self.search.search(query).await
    }

    /// Fetch live detail for one item. Fails with `NotFound` when the item
    /// no longer exists.
    pub async fn get_item_detail(
        &self,
        item_id: &str,
        deadline: Option<Duration>,
    ) -> CatalogResult<ItemDetail> {
        self.detail.get_detail(item_id, deadline).await
    }

    /// Drop the cached application token; the next call re-exchanges.
    pub async fn invalidate_token(&self) {
        self.tokens.invalidate().await;
    }

    pub fn config(&self) -> &CatalogConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builders::catalog_config;
    use crate::core::MockHttpTransport;
    use crate::error::CatalogError;
    use serde_json::json;

    fn test_config() -> CatalogConfig {
        catalog_config()
            .client_id("app-id")
            .client_secret("app-secret")
            .token_endpoint("https://auth.example.com/oauth2/token")
            .api_base_url("https://api.example.com/buy/browse/v1")
            .build()
            .unwrap()
    }

    fn token_response() -> serde_json::Value {
        json!({"access_token": "tok-1", "expires_in": 7200, "token_type": "Bearer"})
    }

    #[tokio::test]
    async fn test_search_obtains_token_then_calls_api() {
        let transport = Arc::new(MockHttpTransport::new());
        transport.queue_json(200, &token_response());
        transport.queue_json(200, &json!({"itemSummaries": [], "total": 0}));
        let client =
            CatalogClient::with_components(test_config(), transport.clone(), InMemoryCacheStore::new());

        let page = client
            .search_by_category(&SearchQuery::by_category("9355"))
            .await
            .unwrap();
        assert_eq!(page.total, 0);

        let requests = transport.requests();
        assert_eq!(requests.len(), 2);
        assert!(requests[0].url.starts_with("https://auth.example.com/"));
        assert!(requests[0]
            .headers
            .get("authorization")
            .unwrap()
            .starts_with("Basic "));
        assert!(requests[1].url.starts_with("https://api.example.com/"));
        assert_eq!(
            requests[1].headers.get("authorization").unwrap(),
            "Bearer tok-1"
        );
    }

    #[tokio::test]
    async fn test_token_is_reused_across_operations() {
        let transport = Arc::new(MockHttpTransport::new());
        transport.queue_json(200, &token_response());
        transport.queue_json(200, &json!({"itemSummaries": [], "total": 0}));
        transport.queue_json(200, &json!({"itemId": "v1|1|0"}));
        let client =
            CatalogClient::with_components(test_config(), transport.clone(), InMemoryCacheStore::new());

        client
            .search_by_category(&SearchQuery::by_category("9355"))
            .await
            .unwrap();
        client.get_item_detail("v1|1|0", None).await.unwrap();

        // One exchange serves both API calls.
        assert_eq!(transport.request_count(), 3);
    }

    #[tokio::test]
    async fn test_detail_not_found() {
        let transport = Arc::new(MockHttpTransport::new());
        transport.queue_json(200, &token_response());
        transport.queue_status(404, "{}");
        let client =
            CatalogClient::with_components(test_config(), transport, InMemoryCacheStore::new());

        let result = client.get_item_detail("v1|gone|0", None).await;
        assert!(matches!(result, Err(CatalogError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_invalid_query_issues_no_network_calls() {
        let transport = Arc::new(MockHttpTransport::new());
        let client =
            CatalogClient::with_components(test_config(), transport.clone(), InMemoryCacheStore::new());

        let result = client.search_by_category(&SearchQuery::default()).await;
        assert!(matches!(result, Err(CatalogError::InvalidQuery { .. })));
        assert_eq!(transport.request_count(), 0);
    }
}
