// search-core/src/request.rs
//! Search request descriptor.
//!
//! One request type serves every backend; the backend-specific parts (how the request is
//! serialized, how it prints, whether a file name is searchable on its own) hang off the
//! [`Dialect`] tag.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};
use url::form_urlencoded;

pub const DEFAULT_NUM_TO_RETURN: usize = 20;
pub const DEFAULT_NUM_TO_SCORE: usize = 100;
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 20_000;

/// searchcode serves results in fixed pages of this many entries
pub const SEARCHCODE_PAGE_SIZE: usize = 20;

/// File type value meaning "no extension filter"
const FILE_TYPE_ALL: &str = "all";

#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
#[serde(rename_all = "kebab-case")]
pub enum Dialect {
    /// Plain parameter mapping, every field sent as its own parameter
    #[default]
    Generic,
    /// searchcode.com style API: file names are searched as query text
    SearchCode,
}

/// Where in the code the searched symbol came from. Informational only.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[strum(serialize_all = "snake_case")]
pub enum SearchContext {
    ClassDeclaration,
    ClassUsage,
    SuperClass,
    Imports,
    MethodUsage,
    MethodDeclaration,
    Package,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchRequest {
    dialect: Dialect,

    // === Query ===
    query: Option<String>,
    facet: Option<String>,
    file_name: Option<String>,
    file_path: Option<String>,
    file_type: Option<String>,

    // === Window & server knobs ===
    start: usize,
    num_to_return: usize,
    num_to_score: usize,
    /// Server-side broker timeout in milliseconds, not the HTTP timeout
    request_timeout: u64,

    // === Not part of equality ===
    description: Option<String>,
    context: Option<SearchContext>,
}

impl Default for SearchRequest {
    fn default() -> Self {
        Self::new(Dialect::default())
    }
}

/// Assign `value` to `slot` unless it is absent or blank.
fn assign(slot: &mut Option<String>, value: Option<&str>) {
    if let Some(value) = value.filter(|v| !v.trim().is_empty()) {
        *slot = Some(value.to_string());
    }
}

impl SearchRequest {
    pub fn new(dialect: Dialect) -> Self {
        Self {
            dialect,
            query: None,
            facet: None,
            file_name: None,
            file_path: None,
            file_type: None,
            start: 0,
            num_to_return: DEFAULT_NUM_TO_RETURN,
            num_to_score: DEFAULT_NUM_TO_SCORE,
            request_timeout: DEFAULT_REQUEST_TIMEOUT_MS,
            description: None,
            context: None,
        }
    }

    // ===== Setters =====

    pub fn set_query<'a>(&mut self, query: impl Into<Option<&'a str>>) -> &mut Self {
        assign(&mut self.query, query.into());
        self
    }

    pub fn set_facet<'a>(&mut self, facet: impl Into<Option<&'a str>>) -> &mut Self {
        assign(&mut self.facet, facet.into());
        self
    }

    /// For [`Dialect::SearchCode`] a file name is only searchable as query text, so the
    /// value lands in `query` instead.
    pub fn set_file_name<'a>(&mut self, file_name: impl Into<Option<&'a str>>) -> &mut Self {
        match self.dialect {
            Dialect::SearchCode => self.set_query(file_name),
            Dialect::Generic => {
                assign(&mut self.file_name, file_name.into());
                self
            }
        }
    }

    pub fn set_file_path<'a>(&mut self, file_path: impl Into<Option<&'a str>>) -> &mut Self {
        assign(&mut self.file_path, file_path.into());
        self
    }

    pub fn set_file_type<'a>(&mut self, file_type: impl Into<Option<&'a str>>) -> &mut Self {
        let file_type = file_type
            .into()
            .filter(|t| !t.trim().eq_ignore_ascii_case(FILE_TYPE_ALL));
        assign(&mut self.file_type, file_type);
        self
    }

    pub fn set_start(&mut self, start: usize) -> &mut Self {
        self.start = start;
        self
    }

    pub fn set_num_to_return(&mut self, num_to_return: usize) -> &mut Self {
        self.num_to_return = num_to_return;
        self
    }

    pub fn set_num_to_score(&mut self, num_to_score: usize) -> &mut Self {
        self.num_to_score = num_to_score;
        self
    }

    pub fn set_request_timeout(&mut self, millis: u64) -> &mut Self {
        self.request_timeout = millis;
        self
    }

    pub fn set_description<'a>(&mut self, description: impl Into<Option<&'a str>>) -> &mut Self {
        assign(&mut self.description, description.into());
        self
    }

    pub fn set_context(&mut self, context: SearchContext) -> &mut Self {
        self.context = Some(context);
        self
    }

    // ===== Getters =====

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    pub fn facet(&self) -> Option<&str> {
        self.facet.as_deref()
    }

    pub fn file_name(&self) -> Option<&str> {
        self.file_name.as_deref()
    }

    pub fn file_path(&self) -> Option<&str> {
        self.file_path.as_deref()
    }

    pub fn file_type(&self) -> Option<&str> {
        self.file_type.as_deref()
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn num_to_return(&self) -> usize {
        self.num_to_return
    }

    pub fn num_to_score(&self) -> usize {
        self.num_to_score
    }

    pub fn request_timeout(&self) -> u64 {
        self.request_timeout
    }

    pub fn context(&self) -> Option<SearchContext> {
        self.context
    }

    /// User facing description shown while the search runs
    pub fn description(&self) -> String {
        match &self.description {
            Some(description) => description.clone(),
            None => format!(
                "Searching for '{}' in {}",
                self.query.as_deref().unwrap_or_default(),
                self.facet.as_deref().unwrap_or("all facets")
            ),
        }
    }

    /// Serialize into the backend's URL-encoded parameter string.
    pub fn build(&self) -> String {
        let mut params = form_urlencoded::Serializer::new(String::new());
        match self.dialect {
            Dialect::Generic => {
                let optional = [
                    ("q", &self.query),
                    ("facet", &self.facet),
                    ("fileName", &self.file_name),
                    ("filePath", &self.file_path),
                    ("fileType", &self.file_type),
                ];
                for (key, value) in optional {
                    if let Some(value) = value {
                        params.append_pair(key, value);
                    }
                }
                params
                    .append_pair("start", &self.start.to_string())
                    .append_pair("num", &self.num_to_return.to_string())
                    .append_pair("numToScore", &self.num_to_score.to_string())
                    .append_pair("timeout", &self.request_timeout.to_string());
            }
            Dialect::SearchCode => {
                let query = self.query.as_deref().unwrap_or_default();
                let q = match &self.file_type {
                    Some(file_type) => format!("{query} ext:{file_type}"),
                    None => query.to_string(),
                };
                params
                    .append_pair("q", &q)
                    .append_pair("p", &(self.start / SEARCHCODE_PAGE_SIZE).to_string());
                if let Some(facet) = &self.facet {
                    params.append_pair("src", facet);
                }
            }
        }
        params.finish()
    }

    fn display_tokens(&self) -> Vec<String> {
        let mut tokens = Vec::new();
        if let Some(query) = &self.query {
            tokens.push(query.clone());
        }
        if self.dialect == Dialect::Generic {
            if let Some(file_name) = &self.file_name {
                tokens.push(format!("file:{file_name}"));
            }
            if let Some(file_path) = &self.file_path {
                tokens.push(format!("path:{file_path}"));
            }
        }
        if let Some(file_type) = &self.file_type {
            tokens.push(format!("ext:{file_type}"));
        }
        if let Some(facet) = &self.facet {
            tokens.push(format!("repo:{facet}"));
        }
        tokens
    }
}

/// Canonical query string, also used as the tab/cache key
impl fmt::Display for SearchRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_tokens().join(" "))
    }
}

// Description and context are presentation details, two requests asking the backend
// the same thing are the same request.
impl PartialEq for SearchRequest {
    fn eq(&self, other: &Self) -> bool {
        self.dialect == other.dialect
            && self.start == other.start
            && self.num_to_return == other.num_to_return
            && self.num_to_score == other.num_to_score
            && self.request_timeout == other.request_timeout
            && self.query == other.query
            && self.facet == other.facet
            && self.file_name == other.file_name
            && self.file_path == other.file_path
            && self.file_type == other.file_type
    }
}

impl Eq for SearchRequest {}

impl Hash for SearchRequest {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.dialect.hash(state);
        self.start.hash(state);
        self.num_to_return.hash(state);
        self.num_to_score.hash(state);
        self.request_timeout.hash(state);
        self.query.hash(state);
        self.facet.hash(state);
        self.file_name.hash(state);
        self.file_path.hash(state);
        self.file_type.hash(state);
    }
}
