//! The contract every code search backend implements.
//!
//! All operations are asynchronous and never panic on backend trouble: a failure comes
//! back as `Err(SearchError)`, which is different from an empty `Ok` list.

use crate::error::Result;
use crate::models::{HighlightEntry, SearchFacet, SearchResult};
use crate::request::SearchRequest;
use async_trait::async_trait;

#[async_trait]
pub trait Searcher: Send + Sync {
    /// Create an empty request in this backend's dialect.
    fn new_request(&self) -> SearchRequest;

    /// Facets for the request. Empty when the backend reports no match at all.
    async fn facets(&self, request: &SearchRequest) -> Result<Vec<SearchFacet>>;

    /// One window of results for the request.
    async fn results(&self, request: &SearchRequest) -> Result<Vec<SearchResult>>;

    /// Raw content of a result file. Only called when a result arrived without content.
    async fn contents(&self, facet_id: &str, file_path: &str) -> Result<String>;

    /// Highlight data for a file. Only called when a result arrived without highlights.
    async fn highlights(
        &self,
        facet_name: &str,
        file_path: &str,
        query: &str,
    ) -> Result<Vec<HighlightEntry>>;
}
