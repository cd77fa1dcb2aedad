//! Configuration Types
//!
//! Catalog client configuration. Built through [`crate::builders::catalog_config`].

use secrecy::SecretString;
use std::time::Duration;

use crate::resilience::RetryPolicy;

/// Catalog client configuration.
#[derive(Clone, Debug)]
pub struct CatalogConfig {
    /// Client credentials for the token exchange.
    pub credentials: ClientCredentials,
    /// Upstream endpoint configuration.
    pub endpoints: EndpointConfig,
    /// OAuth2 scope requested during the client-credentials exchange.
    pub scope: String,
    /// Marketplace identifier attached to every catalog request.
    pub marketplace_id: String,
    /// Currency assumed for price filters and unlabeled prices.
    pub currency: String,
    /// Per-attempt HTTP timeout.
    pub timeout: Duration,
    /// Retry/backoff policy for transient failures.
    pub retry: RetryPolicy,
    /// Tokens are refreshed this long before their reported expiry.
    pub token_safety_margin: Duration,
    /// How concurrent token refreshes are coordinated.
    pub refresh_policy: RefreshPolicy,
    /// How long a degraded cache backend is left alone before re-probing.
    pub cache_cooldown: Duration,
}

/// Upstream endpoint configuration.
#[derive(Clone, Debug)]
pub struct EndpointConfig {
    /// OAuth2 token endpoint (client-credentials exchange).
    pub token_endpoint: String,
    /// Base URL of the catalog API (search and item detail live under it).
    pub api_base_url: String,
}

/// Client credentials for the OAuth2 client-credentials exchange.
#[derive(Clone)]
pub struct ClientCredentials {
    /// Client identifier.
    pub client_id: String,
    /// Client secret.
    pub client_secret: SecretString,
}

impl std::fmt::Debug for ClientCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientCredentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .finish()
    }
}

/// Coordination strategy for concurrent token refreshes.
///
/// `Racy` tolerates concurrent refreshes: callers may race and each perform
/// an exchange, every resulting token is individually valid. `SingleFlight`
/// coalesces them behind a lock, for upstreams with strict token-endpoint
/// rate limits.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum RefreshPolicy {
    #[default]
    Racy,
    SingleFlight,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_secret_is_redacted_in_debug() {
        let credentials = ClientCredentials {
            client_id: "app-id".to_string(),
            client_secret: SecretString::new("super-secret".to_string()),
        };
        let rendered = format!("{:?}", credentials);
        assert!(rendered.contains("app-id"));
        assert!(rendered.contains("[REDACTED]"));
        assert!(!rendered.contains("super-secret"));
    }

    #[test]
    fn test_refresh_policy_defaults_to_racy() {
        assert_eq!(RefreshPolicy::default(), RefreshPolicy::Racy);
    }
}
