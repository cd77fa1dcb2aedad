//! Token Lifecycle
//!
//! OAuth2 client-credentials token acquisition and caching.

pub mod manager;

pub use manager::{ClientCredentialsTokenManager, MockTokenSource, TokenSource};
