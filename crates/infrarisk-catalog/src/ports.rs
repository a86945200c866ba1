//! Port trait definitions
//!
//! The fetcher pages through any [`CatalogSource`]; the HTTP client and the
//! in-memory catalog are the two adapters.

use crate::pagination::SearchPage;
use crate::query::SearchRequest;
use async_trait::async_trait;
use infrarisk_core::Result;

/// Port for executing one page of a catalog search
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Execute a search request and return its page of results
    async fn search(&self, request: &SearchRequest) -> Result<SearchPage>;

    /// Human-readable name of the source, used in logs
    fn source_name(&self) -> &str;
}
