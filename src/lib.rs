//! Catalog Client Module
//!
//! Resilient access layer for a rate-limited, OAuth2-protected product
//! catalog API (eBay Browse style).
//!
//! # Features
//!
//! - Client Credentials token acquisition (RFC 6749 Section 4.4) with
//!   cache-backed reuse and a configurable pre-expiry safety margin
//! - Bounded retry with exponential backoff and jitter for transient
//!   failures (connection errors, timeouts, HTTP 429/5xx)
//! - Forced token refresh on 401 with a single transparent retry
//! - One-page category/keyword search with normalized result records
//! - Single-item detail lookup with `NotFound` mapping
//! - Graceful cache degradation: a dead cache backend degrades to
//!   cache-miss behavior, never to an error
//!
//! # Example
//!
//! ```rust,ignore
//! use catalog_client::{catalog_config, CatalogClient, SearchQuery, ItemCondition};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = catalog_config()
//!         .client_id("my-client-id")
//!         .client_secret("my-client-secret")
//!         .build()?;
//!
//!     let client = CatalogClient::new(config)?;
//!
//!     let page = client
//!         .search_by_category(
//!             &SearchQuery::by_category("9355")
//!                 .condition(ItemCondition::New)
//!                 .price_range(Some(15.0), None),
//!         )
//!         .await?;
//!
//!     for item in &page.items {
//!         let detail = client.get_item_detail(&item.item_id, None).await?;
//!         println!("{}: {:?} available", item.title, detail.quantity.as_option());
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! The module is organized into several sub-modules:
//!
//! - `types`: configuration, token and normalized record types
//! - `error`: error hierarchy separating auth, request and query failures
//! - `cache`: TTL key/value store abstraction with degradation gating
//! - `core`: HTTP transport and the retrying gateway
//! - `resilience`: retry policy, explicit retry state, injectable sleeper
//! - `token`: client-credentials token manager
//! - `browse`: search and item-detail clients with normalization
//! - `builders`: fluent configuration builder
//! - `client`: high-level facade combining all functionality

pub mod browse;
pub mod builders;
pub mod cache;
pub mod client;
pub mod core;
pub mod error;
pub mod resilience;
pub mod token;
pub mod types;

// Re-export main client
pub use client::CatalogClient;

// Re-export builders
pub use builders::{catalog_config, CatalogConfigBuilder};

// Re-export errors
pub use error::{AuthError, CatalogError, CatalogResult, ConfigError, RequestError};

// Re-export types
pub use types::{
    // Config
    CatalogConfig, ClientCredentials, EndpointConfig, RefreshPolicy,
    // Token
    Token, TokenResponse,
    // Records
    ItemDetail, ItemSummary, QuantityEstimate, SearchPage, UNKNOWN_FIELD,
};

// Re-export browse clients
pub use browse::{DetailClient, ItemCondition, SearchClient, SearchQuery};

// Re-export core components
pub use core::{
    // Transport
    HttpMethod, HttpRequest, HttpResponse, HttpTransport, MockHttpTransport,
    ReqwestHttpTransport,
    // Gateway
    AuthMode, GatewayRequest, GatewayResponse, HttpGateway,
};

// Re-export cache components
pub use cache::{
    CacheKey, CacheLookup, CacheStore, CacheWrite, DegradeGate, InMemoryCacheStore,
    NoopCacheStore,
};

// Re-export resilience components
pub use resilience::{RetryPolicy, Sleeper};

// Re-export token components
pub use token::{ClientCredentialsTokenManager, TokenSource};
