//! Token Types

use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::collections::HashMap;

/// A bearer token valid until `expires_at`.
///
/// Owned by the token manager; the only thing that leaves the auth boundary
/// is the `Authorization` header value built from it. A token handed to the
/// gateway is always non-expired at hand-off time because the recorded
/// expiry already has the safety margin subtracted.
#[derive(Clone)]
pub struct Token {
    /// Opaque bearer value.
    pub value: String,
    /// Absolute expiry instant, safety margin already applied.
    pub expires_at: DateTime<Utc>,
}

impl Token {
    /// Check if the token has passed its (margin-adjusted) expiry.
    pub fn is_expired(&self) -> bool {
        self.expires_at <= Utc::now()
    }

    /// Remaining lifetime in seconds, zero once expired.
    pub fn remaining_lifetime(&self) -> i64 {
        (self.expires_at - Utc::now()).num_seconds().max(0)
    }

    /// Render the `Authorization` header value.
    pub fn bearer_header(&self) -> String {
        format!("Bearer {}", self.value)
    }
}

impl std::fmt::Debug for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Token")
            .field("value", &"[REDACTED]")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Token response from the OAuth2 token endpoint.
#[derive(Clone, Debug, Deserialize)]
pub struct TokenResponse {
    /// Access token.
    pub access_token: String,
    /// Token type (usually "Bearer").
    #[serde(default = "default_token_type")]
    pub token_type: String,
    /// Lifetime in seconds.
    #[serde(default)]
    pub expires_in: Option<u64>,
    /// Additional fields.
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

fn default_token_type() -> String {
    "Bearer".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_expiry_checks() {
        let live = Token {
            value: "abc".to_string(),
            expires_at: Utc::now() + Duration::seconds(120),
        };
        assert!(!live.is_expired());
        assert!(live.remaining_lifetime() > 100);

        let dead = Token {
            value: "abc".to_string(),
            expires_at: Utc::now() - Duration::seconds(1),
        };
        assert!(dead.is_expired());
        assert_eq!(dead.remaining_lifetime(), 0);
    }

    #[test]
    fn test_token_value_redacted_in_debug() {
        let token = Token {
            value: "very-secret".to_string(),
            expires_at: Utc::now(),
        };
        assert!(!format!("{:?}", token).contains("very-secret"));
    }

    #[test]
    fn test_token_response_defaults() {
        let response: TokenResponse =
            serde_json::from_str(r#"{"access_token":"tok","expires_in":7200}"#).unwrap();
        assert_eq!(response.access_token, "tok");
        assert_eq!(response.token_type, "Bearer");
        assert_eq!(response.expires_in, Some(7200));
    }

    #[test]
    fn test_bearer_header() {
        let token = Token {
            value: "tok-1".to_string(),
            expires_at: Utc::now(),
        };
        assert_eq!(token.bearer_header(), "Bearer tok-1");
    }
}
