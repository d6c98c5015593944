// search-core/src/config.rs
//! Tunables of the dispatch and paging machinery.

use crate::request::{DEFAULT_NUM_TO_RETURN, DEFAULT_NUM_TO_SCORE, DEFAULT_REQUEST_TIMEOUT_MS};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct SearchConfig {
    /// Results requested per "load more"
    pub page_size: usize,
    /// Delay before a typed pattern is sent, in milliseconds
    pub debounce_ms: u64,
    /// How often a pending lookup re-checks for cancellation, in milliseconds
    pub poll_interval_ms: u64,
    /// File type the finder restricts to unless searching everywhere
    pub default_extension: String,
    pub worker_threads: usize,
    /// Server-side broker timeout in milliseconds
    pub request_timeout_ms: u64,
    pub num_to_score: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_NUM_TO_RETURN,
            debounce_ms: 500,
            poll_interval_ms: 100,
            default_extension: "java".to_string(),
            worker_threads: 5,
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
            num_to_score: DEFAULT_NUM_TO_SCORE,
        }
    }
}

impl SearchConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        // A zero interval would spin the poll loop
        Duration::from_millis(self.poll_interval_ms.max(1))
    }

    /// Page size clamped to at least one result
    pub fn page_size(&self) -> usize {
        self.page_size.max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SearchConfig::default();
        assert_eq!(config.page_size(), 20);
        assert_eq!(config.debounce(), Duration::from_millis(500));
        assert_eq!(config.poll_interval(), Duration::from_millis(100));
        assert_eq!(config.default_extension, "java");
        assert_eq!(config.worker_threads, 5);
    }

    #[test]
    fn test_degenerate_values_are_clamped() {
        let config = SearchConfig {
            page_size: 0,
            poll_interval_ms: 0,
            ..Default::default()
        };
        assert_eq!(config.page_size(), 1);
        assert_eq!(config.poll_interval(), Duration::from_millis(1));
    }
}
