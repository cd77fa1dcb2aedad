//! Token Manager
//!
//! Obtains and caches the application bearer token (OAuth2 client
//! credentials). Cache faults are isolated from auth faults: a dead or
//! corrupt cache degrades to a fresh exchange, it never produces an
//! `AuthError`.

use async_trait::async_trait;
use base64::Engine;
use chrono::{DateTime, Utc};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{debug, warn};

use crate::cache::{CacheKey, CacheLookup, CacheStore};
use crate::core::gateway::{AuthMode, GatewayRequest, HttpGateway};
use crate::core::transport::HttpTransport;
use crate::error::{AuthError, CatalogError, CatalogResult};
use crate::types::config::{ClientCredentials, RefreshPolicy};
use crate::types::token::{Token, TokenResponse};

/// Fixed cache namespace for the application token.
const TOKEN_NAMESPACE: &str = "catalog_app_token";

/// Cached tokens keep at least this much usable lifetime.
const MIN_CACHE_LIFETIME: Duration = Duration::from_secs(60);

/// Lifetime assumed when the token endpoint omits `expires_in`.
const DEFAULT_EXPIRES_IN: u64 = 7200;

/// Source of valid bearer tokens for authenticated requests.
#[async_trait]
pub trait TokenSource: Send + Sync {
    /// Get a token guaranteed non-expired at hand-off time.
    async fn get_valid_token(&self) -> CatalogResult<Token>;

    /// Drop any cached token so the next call performs a fresh exchange.
    async fn invalidate(&self);
}

/// Serialized form of a cached token.
#[derive(Debug, Serialize, Deserialize)]
struct CachedToken {
    access_token: String,
    expires_at: DateTime<Utc>,
}

/// Client-credentials token manager backed by a cache store.
pub struct ClientCredentialsTokenManager<T: HttpTransport, C: CacheStore> {
    credentials: ClientCredentials,
    token_endpoint: String,
    scope: String,
    safety_margin: Duration,
    refresh_policy: RefreshPolicy,
    gateway: HttpGateway<T>,
    cache: Arc<C>,
    refresh_lock: tokio::sync::Mutex<()>,
}

impl<T: HttpTransport, C: CacheStore> ClientCredentialsTokenManager<T, C> {
    /// Create a manager. The gateway must be unauthenticated: the token
    /// exchange itself carries HTTP Basic credentials, not a bearer token.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        credentials: ClientCredentials,
        token_endpoint: String,
        scope: String,
        safety_margin: Duration,
        refresh_policy: RefreshPolicy,
        gateway: HttpGateway<T>,
        cache: Arc<C>,
    ) -> Self {
        Self {
            credentials,
            token_endpoint,
            scope,
            safety_margin,
            refresh_policy,
            gateway,
            cache,
            refresh_lock: tokio::sync::Mutex::new(()),
        }
    }

    fn cache_key(&self) -> CacheKey {
        CacheKey::derive(
            TOKEN_NAMESPACE,
            &serde_json::json!({
                "client_id": self.credentials.client_id,
                "scope": self.scope,
            }),
        )
    }

    fn basic_auth_header(&self) -> String {
        let raw = format!(
            "{}:{}",
            self.credentials.client_id,
            self.credentials.client_secret.expose_secret()
        );
        format!(
            "Basic {}",
            base64::engine::general_purpose::STANDARD.encode(raw)
        )
    }

    fn exchange_body(&self) -> String {
        let mut params = vec![("grant_type", "client_credentials".to_string())];
        if !self.scope.is_empty() {
            params.push(("scope", self.scope.clone()));
        }
        params
            .into_iter()
            .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(&v)))
            .collect::<Vec<_>>()
            .join("&")
    }

    /// Read a still-valid token from the cache. A miss, a degraded backend
    /// and an undecodable entry all report `None` (the caller repopulates).
    async fn cached_token(&self) -> Option<Token> {
        let raw = match self.cache.get(&self.cache_key()).await {
            CacheLookup::Hit(raw) => raw,
            CacheLookup::Miss => return None,
            CacheLookup::Degraded => {
                debug!("token cache degraded, falling back to fresh exchange");
                return None;
            }
        };

        let cached: CachedToken = match serde_json::from_str(&raw) {
            Ok(cached) => cached,
            Err(e) => {
                debug!(error = %e, "corrupt cached token entry, refetching");
                return None;
            }
        };

        // expires_at already accounts for the safety margin.
        if cached.expires_at <= Utc::now() {
            return None;
        }

        Some(Token {
            value: cached.access_token,
            expires_at: cached.expires_at,
        })
    }

    /// Perform the client-credentials exchange and cache the result.
    async fn refresh(&self) -> CatalogResult<Token> {
        if self.credentials.client_id.is_empty() {
            return Err(AuthError::MissingCredentials.into());
        }

        let request = GatewayRequest::post(self.token_endpoint.clone())
            .header("authorization", self.basic_auth_header())
            .header("content-type", "application/x-www-form-urlencoded")
            .header("accept", "application/json")
            .body(self.exchange_body());

        let response = self
            .gateway
            .execute(request, AuthMode::None)
            .await
            .map_err(|err| match err {
                CatalogError::Request(crate::error::RequestError::HttpStatus {
                    status,
                    body,
                }) => AuthError::ExchangeFailed {
                    status,
                    message: body,
                }
                .into(),
                CatalogError::Request(source) => AuthError::ExchangeTransport { source }.into(),
                other => other,
            })?;

        let token_response: TokenResponse =
            serde_json::from_str(&response.body).map_err(|e| AuthError::InvalidTokenResponse {
                message: e.to_string(),
            })?;
        if token_response.access_token.is_empty() {
            return Err(AuthError::InvalidTokenResponse {
                message: "empty access_token".to_string(),
            }
            .into());
        }

        let expires_in = token_response.expires_in.unwrap_or(DEFAULT_EXPIRES_IN);
        let lifetime = Duration::from_secs(expires_in)
            .saturating_sub(self.safety_margin)
            .max(MIN_CACHE_LIFETIME);
        let expires_at = Utc::now() + chrono::Duration::seconds(lifetime.as_secs() as i64);

        let token = Token {
            value: token_response.access_token,
            expires_at,
        };

        // Fire-and-forget write: a cache failure must not fail the refresh.
        let cached = CachedToken {
            access_token: token.value.clone(),
            expires_at,
        };
        if let Ok(serialized) = serde_json::to_string(&cached) {
            self.cache.set(&self.cache_key(), &serialized, lifetime).await;
        }

        debug!(
            expires_in,
            lifetime_secs = lifetime.as_secs(),
            "obtained fresh application token"
        );
        Ok(token)
    }
}

#[async_trait]
impl<T: HttpTransport, C: CacheStore> TokenSource for ClientCredentialsTokenManager<T, C> {
    async fn get_valid_token(&self) -> CatalogResult<Token> {
        if let Some(token) = self.cached_token().await {
            return Ok(token);
        }

        match self.refresh_policy {
            RefreshPolicy::Racy => self.refresh().await,
            RefreshPolicy::SingleFlight => {
                let _guard = self.refresh_lock.lock().await;
                // A flight we waited on may have populated the cache.
                if let Some(token) = self.cached_token().await {
                    return Ok(token);
                }
                self.refresh().await
            }
        }
    }

    async fn invalidate(&self) {
        warn!("invalidating cached application token");
        self.cache.remove(&self.cache_key()).await;
    }
}

/// Mock token source for gateway and client tests.
#[derive(Default)]
pub struct MockTokenSource {
    queued: Mutex<VecDeque<String>>,
    current: Mutex<Option<String>>,
    next_error: Mutex<Option<AuthError>>,
    fetch_count: AtomicU32,
    invalidate_count: AtomicU32,
}

impl MockTokenSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Token values handed out, in order, across invalidations.
    pub fn queue_token(&self, value: &str) -> &Self {
        if let Ok(mut queued) = self.queued.lock() {
            queued.push_back(value.to_string());
        }
        self
    }

    /// Fail the next `get_valid_token` call.
    pub fn set_next_error(&self, error: AuthError) -> &Self {
        if let Ok(mut next) = self.next_error.lock() {
            *next = Some(error);
        }
        self
    }

    pub fn fetch_count(&self) -> u32 {
        self.fetch_count.load(Ordering::SeqCst)
    }

    pub fn invalidate_count(&self) -> u32 {
        self.invalidate_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TokenSource for MockTokenSource {
    async fn get_valid_token(&self) -> CatalogResult<Token> {
        if let Some(error) = self.next_error.lock().ok().and_then(|mut e| e.take()) {
            return Err(error.into());
        }
        self.fetch_count.fetch_add(1, Ordering::SeqCst);

        let mut current = self
            .current
            .lock()
            .map_err(|_| CatalogError::Auth(AuthError::MissingCredentials))?;
        if current.is_none() {
            let popped = self.queued.lock().ok().and_then(|mut q| q.pop_front());
            *current = Some(popped.unwrap_or_else(|| "mock-token".to_string()));
        }

        Ok(Token {
            value: current.clone().unwrap_or_default(),
            expires_at: Utc::now() + chrono::Duration::hours(1),
        })
    }

    async fn invalidate(&self) {
        self.invalidate_count.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut current) = self.current.lock() {
            current.take();
        }
    }
}
