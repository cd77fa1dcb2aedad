//! Browse Clients
//!
//! Search and item-detail clients over the catalog API, plus the
//! normalization from upstream response shapes to the stable record types.

pub mod detail;
mod normalize;
pub mod search;

pub use detail::DetailClient;
pub use search::{ItemCondition, SearchClient, SearchQuery};
