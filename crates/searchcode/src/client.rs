use crate::wire::{FacetsResponse, ResultsResponse};
use async_trait::async_trait;
use reqwest::Response;
use search_core::{
    Dialect, HighlightEntry, Result, SearchError, SearchFacet, SearchRequest, SearchResult,
    Searcher,
};
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

pub const DEFAULT_BASE_URL: &str = "https://searchcode.com/api/codesearch_I/";
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// [`Searcher`] backed by the searchcode HTTP API.
///
/// Results never carry content. The raw-text link of every result seen is remembered so
/// [`Searcher::contents`] can fetch it later by file path.
#[derive(Debug)]
pub struct SearchCodeClient {
    http: reqwest::Client,
    base_url: Url,
    raw_links: Mutex<HashMap<String, String>>,
}

impl SearchCodeClient {
    pub fn new(base_url: Url, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(SearchError::transport)?;
        Ok(Self::with_client(http, base_url))
    }

    pub fn with_client(http: reqwest::Client, base_url: Url) -> Self {
        Self {
            http,
            base_url,
            raw_links: Mutex::new(HashMap::new()),
        }
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    async fn send(&self, url: Url) -> Result<Response> {
        debug!(%url, "GET");
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(SearchError::transport)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SearchError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    async fn get_text(&self, url: Url) -> Result<String> {
        self.send(url)
            .await?
            .text()
            .await
            .map_err(SearchError::transport)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        let body = self.get_text(url).await?;
        serde_json::from_str(&body).map_err(|e| SearchError::malformed(e.to_string()))
    }

    fn remember_raw_link(&self, file_path: &str, link: String) {
        self.raw_links
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(file_path.to_string(), link);
    }

    fn raw_link(&self, file_path: &str) -> Option<String> {
        self.raw_links
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(file_path)
            .cloned()
    }
}

fn log_failure<T>(what: &str, result: Result<T>) -> Result<T> {
    if let Err(e) = &result {
        warn!(error = %e, "searchcode {what} failed");
    }
    result
}

#[async_trait]
impl Searcher for SearchCodeClient {
    fn new_request(&self) -> SearchRequest {
        SearchRequest::new(Dialect::SearchCode)
    }

    async fn facets(&self, request: &SearchRequest) -> Result<Vec<SearchFacet>> {
        let query = request.to_string();
        let mut url = self.base_url.clone();
        url.query_pairs_mut().append_pair("q", &query);

        let response: FacetsResponse = log_failure("facets", self.get_json(url).await)?;
        if response.total == 0 {
            return Ok(Vec::new());
        }
        response
            .source_filters
            .into_iter()
            .map(|filter| filter.into_facet(&query))
            .collect()
    }

    async fn results(&self, request: &SearchRequest) -> Result<Vec<SearchResult>> {
        let mut url = self.base_url.clone();
        url.set_query(Some(&request.build()));

        let response: ResultsResponse = log_failure("results", self.get_json(url).await)?;
        let matched = response.matchterm;
        response
            .results
            .into_iter()
            .map(|raw| {
                let link = raw.raw_link();
                let result = raw.into_result(&matched)?;
                self.remember_raw_link(result.file_path(), link);
                Ok(result)
            })
            .collect()
    }

    async fn contents(&self, _facet_id: &str, file_path: &str) -> Result<String> {
        let link = self
            .raw_link(file_path)
            .ok_or_else(|| SearchError::UnknownFile(file_path.to_string()))?;
        let url = Url::parse(&link).map_err(|e| SearchError::malformed(format!("{link}: {e}")))?;
        log_failure("contents", self.get_text(url).await)
    }

    async fn highlights(
        &self,
        _facet_name: &str,
        _file_path: &str,
        _query: &str,
    ) -> Result<Vec<HighlightEntry>> {
        // Every result already carries its matched lines
        Err(SearchError::Unsupported("highlights"))
    }
}
