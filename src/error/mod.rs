//! Error Taxonomy
//!
//! Failure classes for the catalog access layer. Authentication failures and
//! transient request failures are distinct top-level variants because they
//! demand different operator action (rotate credentials vs. wait and retry).

use std::time::Duration;
use thiserror::Error;

/// Root error type for catalog operations.
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("authentication error: {0}")]
    Auth(#[from] AuthError),

    #[error("request error: {0}")]
    Request(#[from] RequestError),

    /// Caller programming error. Never retried, no network call issued.
    #[error("invalid query: {message}")]
    InvalidQuery { message: String },

    /// Semantic absence of an item, not a failure.
    #[error("item not found: {item_id}")]
    NotFound { item_id: String },
}

impl CatalogError {
    /// Get error code for log correlation.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Config(_) => "CATALOG_CONFIG",
            Self::Auth(_) => "CATALOG_AUTH",
            Self::Request(_) => "CATALOG_REQUEST",
            Self::InvalidQuery { .. } => "CATALOG_QUERY",
            Self::NotFound { .. } => "CATALOG_NOT_FOUND",
        }
    }

    /// Check if the underlying condition is worth retrying.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Request(e) => e.is_retryable(),
            _ => false,
        }
    }
}

/// Configuration error.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required field: {field}")]
    MissingRequired { field: String },

    #[error("invalid endpoint URL: {url}")]
    InvalidEndpoint { url: String },
}

/// Credential or token exchange error.
///
/// Only produced when the upstream credential exchange itself fails. A cache
/// outage never surfaces as an `AuthError`.
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("client credentials are not configured")]
    MissingCredentials,

    #[error("token exchange rejected with HTTP {status}: {message}")]
    ExchangeFailed { status: u16, message: String },

    #[error("token endpoint unreachable: {source}")]
    ExchangeTransport {
        #[source]
        source: RequestError,
    },

    #[error("malformed token response: {message}")]
    InvalidTokenResponse { message: String },

    #[error("credentials rejected: 401 persisted after a forced token refresh")]
    Rejected,
}

/// Transport-level request error.
#[derive(Error, Debug)]
pub enum RequestError {
    #[error("request timed out after {timeout:?}")]
    Timeout { timeout: Duration },

    #[error("connection failed: {message}")]
    ConnectionFailed { message: String },

    #[error("unexpected HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("malformed response: {message}")]
    InvalidResponse { message: String },

    #[error("retries exhausted after {attempts} attempts: {last}")]
    RetriesExhausted {
        attempts: u32,
        #[source]
        last: Box<RequestError>,
    },
}

impl RequestError {
    /// Retryable conditions: connection failures, timeouts, HTTP 429/5xx.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Timeout { .. } | Self::ConnectionFailed { .. } => true,
            Self::HttpStatus { status, .. } => *status == 429 || (500..=599).contains(status),
            Self::InvalidResponse { .. } | Self::RetriesExhausted { .. } => false,
        }
    }

    /// Short class label for structured log fields.
    pub fn class(&self) -> &'static str {
        match self {
            Self::Timeout { .. } => "timeout",
            Self::ConnectionFailed { .. } => "connection",
            Self::HttpStatus { .. } => "http_status",
            Self::InvalidResponse { .. } => "invalid_response",
            Self::RetriesExhausted { .. } => "retries_exhausted",
        }
    }
}

/// Result type for catalog operations.
pub type CatalogResult<T> = Result<T, CatalogError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_request_errors() {
        assert!(RequestError::Timeout {
            timeout: Duration::from_secs(30)
        }
        .is_retryable());
        assert!(RequestError::ConnectionFailed {
            message: "refused".to_string()
        }
        .is_retryable());
        assert!(RequestError::HttpStatus {
            status: 429,
            body: String::new()
        }
        .is_retryable());
        assert!(RequestError::HttpStatus {
            status: 503,
            body: String::new()
        }
        .is_retryable());
    }

    #[test]
    fn test_non_retryable_request_errors() {
        assert!(!RequestError::HttpStatus {
            status: 404,
            body: String::new()
        }
        .is_retryable());
        assert!(!RequestError::HttpStatus {
            status: 400,
            body: String::new()
        }
        .is_retryable());
        assert!(!RequestError::InvalidResponse {
            message: "bad json".to_string()
        }
        .is_retryable());
    }

    #[test]
    fn test_auth_errors_never_retryable() {
        let error = CatalogError::Auth(AuthError::Rejected);
        assert!(!error.is_retryable());
        assert_eq!(error.error_code(), "CATALOG_AUTH");
    }

    #[test]
    fn test_error_codes_distinguish_failure_classes() {
        let auth = CatalogError::Auth(AuthError::MissingCredentials);
        let request = CatalogError::Request(RequestError::ConnectionFailed {
            message: "down".to_string(),
        });
        assert_ne!(auth.error_code(), request.error_code());
    }

    #[test]
    fn test_retries_exhausted_keeps_last_error() {
        let error = RequestError::RetriesExhausted {
            attempts: 5,
            last: Box::new(RequestError::HttpStatus {
                status: 503,
                body: "unavailable".to_string(),
            }),
        };
        assert!(!error.is_retryable());
        assert!(error.to_string().contains("5 attempts"));
        assert!(error.to_string().contains("503"));
    }
}
