//! Catalog configuration builder.
//!
//! Validation happens at `build()`: credentials are required, endpoint URLs
//! must parse. Everything else has production defaults.

use secrecy::SecretString;
use std::time::Duration;
use url::Url;

use crate::error::ConfigError;
use crate::resilience::RetryPolicy;
use crate::types::{CatalogConfig, ClientCredentials, EndpointConfig, RefreshPolicy};

const DEFAULT_TOKEN_ENDPOINT: &str = "https://api.ebay.com/identity/v1/oauth2/token";
const DEFAULT_API_BASE_URL: &str = "https://api.ebay.com/buy/browse/v1";
const DEFAULT_SCOPE: &str = "https://api.ebay.com/oauth/api_scope";
const DEFAULT_MARKETPLACE_ID: &str = "EBAY_US";
const DEFAULT_CURRENCY: &str = "USD";

/// Start building a catalog configuration.
pub fn catalog_config() -> CatalogConfigBuilder {
    CatalogConfigBuilder::default()
}

/// Fluent builder for [`CatalogConfig`].
#[derive(Debug)]
pub struct CatalogConfigBuilder {
    client_id: Option<String>,
    client_secret: Option<SecretString>,
    token_endpoint: String,
    api_base_url: String,
    scope: String,
    marketplace_id: String,
    currency: String,
    timeout: Duration,
    retry: RetryPolicy,
    token_safety_margin: Duration,
    refresh_policy: RefreshPolicy,
    cache_cooldown: Duration,
}

impl Default for CatalogConfigBuilder {
    fn default() -> Self {
        Self {
            client_id: None,
            client_secret: None,
            token_endpoint: DEFAULT_TOKEN_ENDPOINT.to_string(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            scope: DEFAULT_SCOPE.to_string(),
            marketplace_id: DEFAULT_MARKETPLACE_ID.to_string(),
            currency: DEFAULT_CURRENCY.to_string(),
            timeout: Duration::from_secs(30),
            retry: RetryPolicy::default(),
            token_safety_margin: Duration::from_secs(60),
            refresh_policy: RefreshPolicy::default(),
            cache_cooldown: Duration::from_secs(30),
        }
    }
}

impl CatalogConfigBuilder {
    pub fn client_id(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = Some(client_id.into());
        self
    }

    pub fn client_secret(mut self, client_secret: impl Into<String>) -> Self {
        self.client_secret = Some(SecretString::new(client_secret.into()));
        self
    }

    pub fn token_endpoint(mut self, url: impl Into<String>) -> Self {
        self.token_endpoint = url.into();
        self
    }

    pub fn api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }

    pub fn scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = scope.into();
        self
    }

    pub fn marketplace_id(mut self, marketplace_id: impl Into<String>) -> Self {
        self.marketplace_id = marketplace_id.into();
        self
    }

    pub fn currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = currency.into();
        self
    }

    /// Per-attempt HTTP timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Refresh tokens this long before their reported expiry.
    pub fn token_safety_margin(mut self, margin: Duration) -> Self {
        self.token_safety_margin = margin;
        self
    }

    pub fn refresh_policy(mut self, policy: RefreshPolicy) -> Self {
        self.refresh_policy = policy;
        self
    }

    /// How long a degraded cache backend is left alone before re-probing.
    pub fn cache_cooldown(mut self, cooldown: Duration) -> Self {
        self.cache_cooldown = cooldown;
        self
    }

    /// Validate and build the configuration.
    pub fn build(self) -> Result<CatalogConfig, ConfigError> {
        let client_id = self
            .client_id
            .filter(|id| !id.is_empty())
            .ok_or_else(|| ConfigError::MissingRequired {
                field: "client_id".to_string(),
            })?;
        let client_secret = self
            .client_secret
            .ok_or_else(|| ConfigError::MissingRequired {
                field: "client_secret".to_string(),
            })?;

        for url in [&self.token_endpoint, &self.api_base_url] {
            Url::parse(url).map_err(|_| ConfigError::InvalidEndpoint { url: url.clone() })?;
        }

        Ok(CatalogConfig {
            credentials: ClientCredentials {
                client_id,
                client_secret,
            },
            endpoints: EndpointConfig {
                token_endpoint: self.token_endpoint,
                api_base_url: self.api_base_url,
            },
            scope: self.scope,
            marketplace_id: self.marketplace_id,
            currency: self.currency,
            timeout: self.timeout,
            retry: self.retry,
            token_safety_margin: self.token_safety_margin,
            refresh_policy: self.refresh_policy,
            cache_cooldown: self.cache_cooldown,
        })
    }
}
