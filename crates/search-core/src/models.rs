// search-core/src/models.rs
//! Value types returned by a searcher.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A scope (repository/product) with the number of hits the query has in it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchFacet {
    id: String,
    name: String,
    match_count: usize,
    /// The query that produced this facet
    query: String,
}

impl SearchFacet {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        match_count: usize,
        query: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            match_count,
            query: query.into(),
        }
    }

    /// Facet whose id is its name
    pub fn named(name: impl Into<String>, match_count: usize, query: impl Into<String>) -> Self {
        let name = name.into();
        Self::new(name.clone(), name, match_count, query)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn match_count(&self) -> usize {
        self.match_count
    }

    pub fn query(&self) -> &str {
        &self.query
    }
}

impl fmt::Display for SearchFacet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.match_count)
    }
}

/// One matched line inside a result's file content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighlightEntry {
    /// Zero-based, relative to the file content
    pub line_number: usize,
    /// Text that matched; not necessarily the query itself
    pub matched: String,
}

impl HighlightEntry {
    pub fn new(line_number: usize, matched: impl Into<String>) -> Self {
        Self {
            line_number,
            matched: matched.into(),
        }
    }
}

/// A single file hit.
///
/// `content` and `highlights` may be absent until backfilled. `None` means
/// "not fetched yet", `Some(vec![])` means "fetched, nothing to highlight".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    file_name: String,
    file_path: String,
    product_name: String,
    file_extension: String,
    external_link: Option<String>,
    content: Option<String>,
    highlights: Option<Vec<HighlightEntry>>,
}

impl SearchResult {
    pub fn new(file_name: impl Into<String>, file_path: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            file_path: file_path.into(),
            ..Default::default()
        }
    }

    pub fn with_product(mut self, product_name: impl Into<String>) -> Self {
        self.product_name = product_name.into();
        self
    }

    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.file_extension = extension.into();
        self
    }

    pub fn with_external_link(mut self, link: impl Into<String>) -> Self {
        self.external_link = Some(link.into());
        self
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    pub fn with_highlights(mut self, highlights: Vec<HighlightEntry>) -> Self {
        self.highlights = Some(highlights);
        self
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn file_path(&self) -> &str {
        &self.file_path
    }

    pub fn product_name(&self) -> &str {
        &self.product_name
    }

    pub fn file_extension(&self) -> &str {
        &self.file_extension
    }

    pub fn external_link(&self) -> Option<&str> {
        self.external_link.as_deref()
    }

    pub fn content(&self) -> Option<&str> {
        self.content.as_deref()
    }

    pub fn highlights(&self) -> Option<&[HighlightEntry]> {
        self.highlights.as_deref()
    }

    pub fn needs_backfill(&self) -> bool {
        self.content.is_none() || self.highlights.is_none()
    }

    /// Fill in content that was not delivered with the result. Present content is kept.
    pub fn fill_content(&mut self, content: String) -> bool {
        if self.content.is_some() {
            return false;
        }
        self.content = Some(content);
        true
    }

    /// Fill in highlight data that was not delivered with the result.
    pub fn fill_highlights(&mut self, highlights: Vec<HighlightEntry>) -> bool {
        if self.highlights.is_some() {
            return false;
        }
        self.highlights = Some(highlights);
        true
    }

    /// Key used to avoid listing the same file twice under one facet
    pub(crate) fn dedup_key(&self) -> (&str, &str) {
        (&self.product_name, &self.file_path)
    }
}

impl fmt::Display for SearchResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.file_path)
    }
}
