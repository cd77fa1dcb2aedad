//! Configuration Builder
//!
//! Fluent construction and validation of [`crate::types::CatalogConfig`].

pub mod config;

pub use config::{catalog_config, CatalogConfigBuilder};
