//! JSON payloads of the searchcode API.
//!
//! Ids and counts arrive as numbers from the public service but as strings from some
//! mirrors, so both are accepted.

use search_core::{HighlightEntry, SearchError, SearchFacet, SearchResult};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;

#[derive(Debug, Deserialize)]
pub(crate) struct FacetsResponse {
    pub total: u64,
    #[serde(default)]
    pub source_filters: Vec<SourceFilter>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SourceFilter {
    pub id: Value,
    pub source: String,
    pub count: Value,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ResultsResponse {
    pub matchterm: String,
    #[serde(default)]
    pub results: Vec<RawResult>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawResult {
    pub filename: String,
    pub language: String,
    /// Repository the file lives in
    pub name: String,
    pub url: String,
    /// 1-based line number to line text
    #[serde(default)]
    pub lines: HashMap<String, Value>,
}

fn scalar(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

impl SourceFilter {
    pub fn into_facet(self, query: &str) -> Result<SearchFacet, SearchError> {
        let id = scalar(&self.id)
            .ok_or_else(|| SearchError::malformed(format!("facet id {}", self.id)))?;
        let count = scalar(&self.count)
            .and_then(|c| c.parse::<usize>().ok())
            .ok_or_else(|| SearchError::malformed(format!("facet count {}", self.count)))?;
        Ok(SearchFacet::new(id, self.source, count, query))
    }
}

impl RawResult {
    /// Link serving the file's plain text
    pub fn raw_link(&self) -> String {
        self.url.replace("/view/", "/raw/")
    }

    pub fn highlights(&self, matched: &str) -> Result<Vec<HighlightEntry>, SearchError> {
        let mut entries = self
            .lines
            .keys()
            .map(|key| {
                key.parse::<usize>()
                    .ok()
                    .and_then(|line| line.checked_sub(1))
                    .map(|line| HighlightEntry::new(line, matched))
                    .ok_or_else(|| SearchError::malformed(format!("line number {key:?}")))
            })
            .collect::<Result<Vec<_>, _>>()?;
        entries.sort_by_key(|entry| entry.line_number);
        Ok(entries)
    }

    pub fn into_result(self, matched: &str) -> Result<SearchResult, SearchError> {
        let highlights = self.highlights(matched)?;
        Ok(SearchResult::new(
            self.filename.clone(),
            format!("{} in {}", self.filename, self.name),
        )
        .with_product(self.name)
        .with_extension(self.language)
        .with_external_link(self.url)
        .with_highlights(highlights))
    }
}
