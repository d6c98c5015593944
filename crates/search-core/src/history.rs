//! Recently issued searches.

use crate::request::SearchRequest;
use indexmap::IndexSet;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Insertion-ordered set of requests, oldest first.
///
/// Requests are compared with [`SearchRequest`] equality, so a request that only differs
/// in its description counts as the same search. Re-adding moves it to the newest end.
#[derive(Debug, Default)]
pub struct SearchHistory {
    entries: Mutex<IndexSet<SearchRequest>>,
}

impl SearchHistory {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, IndexSet<SearchRequest>> {
        // The set stays consistent even if a holder panicked
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn add(&self, request: SearchRequest) {
        let mut entries = self.lock();
        entries.shift_remove(&request);
        entries.insert(request);
    }

    /// Snapshot, oldest to newest
    pub fn recent_queries(&self) -> Vec<SearchRequest> {
        self.lock().iter().cloned().collect()
    }

    pub fn most_recent_first(&self) -> Vec<SearchRequest> {
        self.lock().iter().rev().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::Dialect;
    use std::sync::Arc;

    fn request(query: &str) -> SearchRequest {
        let mut request = SearchRequest::new(Dialect::Generic);
        request.set_query(query);
        request
    }

    #[test]
    fn test_same_request_twice_keeps_one() {
        let history = SearchHistory::new();
        history.add(request("a"));
        history.add(request("a"));

        assert_eq!(history.len(), 1);
        assert_eq!(history.recent_queries(), vec![request("a")]);
    }

    #[test]
    fn test_readding_moves_to_newest() {
        let history = SearchHistory::new();
        history.add(request("a"));
        history.add(request("b"));

        let mut copy = request("a");
        copy.set_description("again");
        history.add(copy);

        assert_eq!(history.recent_queries(), vec![request("b"), request("a")]);
        assert_eq!(history.most_recent_first(), vec![request("a"), request("b")]);
        assert_eq!(history.most_recent_first()[0].description(), "again");
    }

    #[test]
    fn test_clear() {
        let history = SearchHistory::new();
        history.add(request("a"));
        history.clear();
        assert!(history.is_empty());
    }

    #[test]
    fn test_shared_across_threads() {
        let history = Arc::new(SearchHistory::new());
        let workers: Vec<_> = (0..4)
            .map(|i| {
                let history = history.clone();
                std::thread::spawn(move || {
                    for j in 0..25 {
                        history.add(request(&format!("{}", (i * 25 + j) % 50)));
                    }
                })
            })
            .collect();
        for worker in workers {
            worker.join().unwrap();
        }
        assert_eq!(history.len(), 50);
    }
}
