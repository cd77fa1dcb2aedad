//! HTTP Gateway
//!
//! Wraps the transport with bounded retry/backoff and bearer-token
//! attachment. One logical request is one sequential attempt chain; backoff
//! suspends only the calling task. The token is re-fetched per attempt so a
//! token expiring mid-sequence is transparently refreshed, and a 401 on an
//! authenticated call triggers exactly one forced invalidate + refresh +
//! retry before surfacing an auth failure.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};
use url::Url;

use crate::core::transport::{HttpMethod, HttpRequest, HttpTransport};
use crate::error::{AuthError, CatalogError, CatalogResult, RequestError};
use crate::resilience::{RetryPolicy, RetryState, Sleeper, TokioSleeper};
use crate::token::TokenSource;

/// Response bodies quoted in errors are capped at this many bytes.
const MAX_ERROR_BODY_LEN: usize = 2048;

/// Whether the gateway attaches a bearer token.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AuthMode {
    None,
    Bearer,
}

/// A logical request: retried as a whole under one deadline.
#[derive(Clone, Debug)]
pub struct GatewayRequest {
    pub method: HttpMethod,
    pub url: String,
    pub query: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
    /// Overall budget covering all attempts and backoff delays.
    pub deadline: Option<Duration>,
}

impl GatewayRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: HttpMethod::Get,
            url: url.into(),
            query: Vec::new(),
            headers: Vec::new(),
            body: None,
            deadline: None,
        }
    }

    pub fn post(url: impl Into<String>) -> Self {
        Self {
            method: HttpMethod::Post,
            ..Self::get(url)
        }
    }

    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((key.into(), value.into()));
        self
    }

    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }
}

/// Successful gateway response.
#[derive(Clone, Debug)]
pub struct GatewayResponse {
    pub status: u16,
    pub headers: HashMap<String, String>,
    pub body: String,
    /// Transient retries spent on this request.
    pub retries: u32,
}

impl GatewayResponse {
    /// Deserialize the body, mapping parse failures to `InvalidResponse`.
    pub fn json<D: serde::de::DeserializeOwned>(&self) -> Result<D, RequestError> {
        serde_json::from_str(&self.body).map_err(|e| RequestError::InvalidResponse {
            message: e.to_string(),
        })
    }
}

/// Retrying HTTP gateway over a shared transport.
pub struct HttpGateway<T: HttpTransport> {
    transport: Arc<T>,
    policy: RetryPolicy,
    per_attempt_timeout: Duration,
    sleeper: Arc<dyn Sleeper>,
    tokens: Option<Arc<dyn TokenSource>>,
}

impl<T: HttpTransport> HttpGateway<T> {
    pub fn new(transport: Arc<T>, policy: RetryPolicy, per_attempt_timeout: Duration) -> Self {
        Self {
            transport,
            policy,
            per_attempt_timeout,
            sleeper: Arc::new(TokioSleeper),
            tokens: None,
        }
    }

    /// Replace the delay implementation (tests).
    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    /// Attach a token source, enabling `AuthMode::Bearer`.
    pub fn with_token_source(mut self, tokens: Arc<dyn TokenSource>) -> Self {
        self.tokens = Some(tokens);
        self
    }

    /// Execute a request with retry/backoff.
    ///
    /// Retryable: connection failures, timeouts, HTTP 429/5xx. Everything
    /// else surfaces immediately. On exhaustion the last observed error is
    /// wrapped as `RetriesExhausted`.
    pub async fn execute(
        &self,
        request: GatewayRequest,
        auth: AuthMode,
    ) -> CatalogResult<GatewayResponse> {
        let url = build_url(&request)?;
        let started = Instant::now();
        let mut state = RetryState::new();
        let mut refreshed_after_unauthorized = false;

        loop {
            state.begin_attempt();

            let mut headers: HashMap<String, String> =
                request.headers.iter().cloned().collect();
            if auth == AuthMode::Bearer {
                let tokens = self
                    .tokens
                    .as_ref()
                    .ok_or(CatalogError::Auth(AuthError::MissingCredentials))?;
                let token = tokens.get_valid_token().await?;
                headers.insert("authorization".to_string(), token.bearer_header());
            }

            let timeout = self.attempt_timeout(&request, started)?;
            let attempt = HttpRequest {
                method: request.method,
                url: url.clone(),
                headers,
                body: request.body.clone(),
                timeout: Some(timeout),
            };

            let error = match self.transport.send(attempt).await {
                Ok(response) if (200..300).contains(&response.status) => {
                    debug!(
                        status = response.status,
                        retries = state.retries(),
                        url = %url,
                        "request succeeded"
                    );
                    return Ok(GatewayResponse {
                        status: response.status,
                        headers: response.headers,
                        body: response.body,
                        retries: state.retries(),
                    });
                }
                Ok(response) if response.status == 401 && auth == AuthMode::Bearer => {
                    if refreshed_after_unauthorized {
                        warn!(url = %url, "401 persisted after forced token refresh");
                        return Err(AuthError::Rejected.into());
                    }
                    refreshed_after_unauthorized = true;
                    warn!(url = %url, "401 on authenticated call, forcing token refresh");
                    if let Some(tokens) = self.tokens.as_ref() {
                        tokens.invalidate().await;
                    }
                    continue;
                }
                Ok(response) => RequestError::HttpStatus {
                    status: response.status,
                    body: truncate_body(response.body),
                },
                Err(error) => error,
            };

            if !error.is_retryable() {
                return Err(error.into());
            }
            self.backoff(&mut state, error, started, request.deadline)
                .await?;
        }
    }

    /// Timeout for the next attempt, clipped to the remaining deadline.
    fn attempt_timeout(
        &self,
        request: &GatewayRequest,
        started: Instant,
    ) -> CatalogResult<Duration> {
        match request.deadline {
            None => Ok(self.per_attempt_timeout),
            Some(deadline) => {
                let remaining = deadline.saturating_sub(started.elapsed());
                if remaining.is_zero() {
                    Err(RequestError::Timeout { timeout: deadline }.into())
                } else {
                    Ok(self.per_attempt_timeout.min(remaining))
                }
            }
        }
    }

    /// Sleep before the next attempt, or wrap up with `RetriesExhausted`.
    async fn backoff(
        &self,
        state: &mut RetryState,
        error: RequestError,
        started: Instant,
        deadline: Option<Duration>,
    ) -> CatalogResult<()> {
        if !state.can_retry(&self.policy) {
            return Err(RequestError::RetriesExhausted {
                attempts: state.attempts(),
                last: Box::new(error),
            }
            .into());
        }

        let delay = self.policy.delay_for(state.retries());

        // A backoff that would outlive the deadline is pointless; give up
        // now rather than sleeping past it.
        if let Some(deadline) = deadline {
            let remaining = deadline.saturating_sub(started.elapsed());
            if delay >= remaining {
                return Err(RequestError::RetriesExhausted {
                    attempts: state.attempts(),
                    last: Box::new(error),
                }
                .into());
            }
        }

        debug!(
            attempt = state.attempts(),
            delay_ms = delay.as_millis() as u64,
            class = error.class(),
            "transient failure, backing off"
        );
        state.record_backoff(delay, error.class());
        self.sleeper.sleep(delay).await;
        Ok(())
    }
}

fn build_url(request: &GatewayRequest) -> CatalogResult<String> {
    let mut url = Url::parse(&request.url).map_err(|e| CatalogError::InvalidQuery {
        message: format!("invalid request URL {}: {}", request.url, e),
    })?;
    if !request.query.is_empty() {
        let mut pairs = url.query_pairs_mut();
        for (key, value) in &request.query {
            pairs.append_pair(key, value);
        }
    }
    Ok(url.to_string())
}

fn truncate_body(body: String) -> String {
    if body.len() <= MAX_ERROR_BODY_LEN {
        return body;
    }
    let mut cut = MAX_ERROR_BODY_LEN;
    while !body.is_char_boundary(cut) {
        cut -= 1;
    }
    body[..cut].to_string()
}
