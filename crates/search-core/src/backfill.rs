//! Completing a result before it is opened.

use crate::models::{SearchFacet, SearchResult};
use crate::searcher::Searcher;
use tracing::debug;

/// Fetch whatever `result` arrived without.
///
/// Content and highlights are fetched independently; a failure is logged and leaves
/// that field absent so the result can still be opened. Returns whether anything was
/// filled in.
pub async fn validate_result(searcher: &dyn Searcher, result: &mut SearchResult, facet: &SearchFacet) -> bool {
    let mut filled = false;

    if result.content().is_none() {
        match searcher.contents(facet.id(), result.file_path()).await {
            Ok(content) => filled |= result.fill_content(content),
            Err(e) => debug!(file = result.file_path(), error = %e, "could not fetch contents"),
        }
    }

    if result.highlights().is_none() {
        match searcher
            .highlights(facet.name(), result.file_path(), facet.query())
            .await
        {
            Ok(highlights) => filled |= result.fill_highlights(highlights),
            Err(e) => debug!(file = result.file_path(), error = %e, "could not fetch highlights"),
        }
    }

    filled
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dummy::DummySearcher;
    use crate::error::{Result, SearchError};
    use crate::models::HighlightEntry;
    use crate::request::SearchRequest;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Fails every backfill call and counts them
    #[derive(Default)]
    struct Unreachable {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl Searcher for Unreachable {
        fn new_request(&self) -> SearchRequest {
            SearchRequest::default()
        }

        async fn facets(&self, _: &SearchRequest) -> Result<Vec<SearchFacet>> {
            Ok(Vec::new())
        }

        async fn results(&self, _: &SearchRequest) -> Result<Vec<SearchResult>> {
            Ok(Vec::new())
        }

        async fn contents(&self, _: &str, _: &str) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(SearchError::transport("offline"))
        }

        async fn highlights(&self, _: &str, _: &str, _: &str) -> Result<Vec<HighlightEntry>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(SearchError::transport("offline"))
        }
    }

    fn facet() -> SearchFacet {
        SearchFacet::named("dummy-mp", 1, "query")
    }

    #[tokio::test]
    async fn test_fills_missing_fields() {
        let mut result = SearchResult::new("A.java", "A.java");
        assert!(validate_result(&DummySearcher, &mut result, &facet()).await);

        assert_eq!(result.content(), Some("dummyContent"));
        assert_eq!(result.highlights(), Some(&[][..]));
    }

    #[tokio::test]
    async fn test_present_fields_are_not_refetched() {
        let searcher = Unreachable::default();
        let mut result = SearchResult::new("A.java", "A.java")
            .with_content("kept")
            .with_highlights(vec![HighlightEntry::new(2, "A")]);

        assert!(!validate_result(&searcher, &mut result, &facet()).await);
        assert_eq!(searcher.calls.load(Ordering::SeqCst), 0);
        assert_eq!(result.content(), Some("kept"));
    }

    #[tokio::test]
    async fn test_failures_leave_fields_absent() {
        let searcher = Unreachable::default();
        let mut result = SearchResult::new("A.java", "A.java");

        assert!(!validate_result(&searcher, &mut result, &facet()).await);
        assert_eq!(searcher.calls.load(Ordering::SeqCst), 2);
        assert!(result.needs_backfill());
    }
}
