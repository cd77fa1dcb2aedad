//! Data Types
//!
//! Configuration, token, and normalized record types.

pub mod config;
pub mod item;
pub mod token;

pub use config::{CatalogConfig, ClientCredentials, EndpointConfig, RefreshPolicy};
pub use item::{ItemDetail, ItemSummary, QuantityEstimate, SearchPage, UNKNOWN_FIELD};
pub use token::{Token, TokenResponse};
