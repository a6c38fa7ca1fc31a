//! Infrastructure module containing the API client, cache and collaborators
//!
//! This module provides foundational services used across all domains

pub mod api_client;
pub mod navigation;
pub mod query_cache;
pub mod services;
pub mod testing;

// Re-export commonly used items
pub use api_client::{ApiClient, ApiError, ApiResult};
pub use navigation::{LogNavigator, Navigator, Route};
pub use query_cache::{CacheInvalidator, CachedQuery, QueryCache, QueryKey};
