//! Offline searcher that answers every request with canned data.

use crate::error::Result;
use crate::models::{HighlightEntry, SearchFacet, SearchResult};
use crate::request::{Dialect, SearchRequest};
use crate::searcher::Searcher;
use async_trait::async_trait;
use tracing::debug;

pub const DUMMY_FACET: &str = "dummy-mp";
const DUMMY_MATCH_COUNT: usize = 100;
const DUMMY_PRODUCT: &str = "Dummy";

#[derive(Debug, Default, Clone, Copy)]
pub struct DummySearcher;

#[async_trait]
impl Searcher for DummySearcher {
    fn new_request(&self) -> SearchRequest {
        SearchRequest::new(Dialect::Generic)
    }

    async fn facets(&self, request: &SearchRequest) -> Result<Vec<SearchFacet>> {
        debug!(request = %request, "dummy facets");
        Ok(vec![SearchFacet::named(
            DUMMY_FACET,
            DUMMY_MATCH_COUNT,
            request.to_string(),
        )])
    }

    async fn results(&self, request: &SearchRequest) -> Result<Vec<SearchResult>> {
        debug!(request = %request, "dummy results");
        let product = request.facet().unwrap_or(DUMMY_PRODUCT);
        let result = SearchResult::new("DummyFile.java", "dummy-mp/src/java/DummyFile.java")
            .with_extension("java")
            .with_product(product)
            .with_content("dummy content");
        Ok(vec![result])
    }

    async fn contents(&self, _facet_id: &str, _file_path: &str) -> Result<String> {
        Ok("dummyContent".to_string())
    }

    async fn highlights(
        &self,
        _facet_name: &str,
        _file_path: &str,
        _query: &str,
    ) -> Result<Vec<HighlightEntry>> {
        Ok(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_canned_facet() {
        let searcher = DummySearcher;
        let mut request = searcher.new_request();
        request.set_query("anything");

        let facets = searcher.facets(&request).await.unwrap();
        assert_eq!(facets.len(), 1);
        assert_eq!(facets[0].name(), DUMMY_FACET);
        assert_eq!(facets[0].match_count(), 100);
        assert_eq!(facets[0].query(), "anything");
    }

    #[tokio::test]
    async fn test_result_product_follows_facet() {
        let searcher = DummySearcher;
        let mut request = searcher.new_request();

        let results = searcher.results(&request).await.unwrap();
        assert_eq!(results[0].product_name(), "Dummy");
        assert!(results[0].highlights().is_none());

        request.set_facet("jdk");
        let results = searcher.results(&request).await.unwrap();
        assert_eq!(results[0].product_name(), "jdk");
        assert_eq!(results[0].content(), Some("dummy content"));
    }
}
