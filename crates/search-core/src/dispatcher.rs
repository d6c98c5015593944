//! "Search as you type" dispatch.
//!
//! Every keystroke produces a new pattern; the host cancels the previous token and
//! calls [`DebouncedDispatcher::filter_elements`] again. The lookup only leaves the
//! process once the debounce delay has passed without a cancellation.

use crate::config::SearchConfig;
use crate::error::SearchError;
use crate::executor::{SearchExecutor, WaitOutcome};
use crate::models::SearchResult;
use crate::request::SearchRequest;
use crate::searcher::Searcher;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Separates the file name pattern from the facet, e.g. `Pool.java in commons`
const FACET_SEPARATOR: &str = " in ";

#[derive(Debug)]
pub enum DispatchOutcome {
    /// The lookup resolved; `count` results reached the sink
    Delivered { count: usize },
    Cancelled,
    Failed(SearchError),
}

pub struct DebouncedDispatcher {
    searcher: Arc<dyn Searcher>,
    executor: SearchExecutor,
    debounce: Duration,
    poll_interval: Duration,
    default_extension: String,
}

impl DebouncedDispatcher {
    pub fn new(searcher: Arc<dyn Searcher>, executor: SearchExecutor, config: &SearchConfig) -> Self {
        Self {
            searcher,
            executor,
            debounce: config.debounce(),
            poll_interval: config.poll_interval(),
            default_extension: config.default_extension.clone(),
        }
    }

    /// Turn a typed pattern into a request.
    pub fn build_request(&self, pattern: &str, everywhere: bool) -> SearchRequest {
        let mut parts = pattern.split(FACET_SEPARATOR);
        let file_name = parts.next().unwrap_or_default();

        let mut request = self.searcher.new_request();
        request.set_file_name(file_name).set_facet(parts.next());
        if !everywhere {
            request.set_file_type(self.default_extension.as_str());
        }
        request
    }

    /// Look up files matching `pattern` and feed them to `sink` in backend order.
    ///
    /// `sink` returns `false` to stop taking results. Waiting never gives up on its own,
    /// only `cancel` ends it early.
    pub async fn filter_elements<F>(
        &self,
        pattern: &str,
        everywhere: bool,
        cancel: &CancellationToken,
        mut sink: F,
    ) -> DispatchOutcome
    where
        F: FnMut(SearchResult) -> bool,
    {
        let request = self.build_request(pattern, everywhere);
        if cancel.is_cancelled() {
            debug!(pattern, "cancelled before dispatch");
            return DispatchOutcome::Cancelled;
        }

        let mut handle =
            self.executor
                .schedule_results(self.searcher.clone(), request, self.debounce);

        loop {
            match handle.wait_timeout(self.poll_interval).await {
                WaitOutcome::TimedOut => {
                    if cancel.is_cancelled() {
                        handle.cancel(true);
                        debug!(pattern, state = ?handle.state(), "lookup cancelled");
                        return DispatchOutcome::Cancelled;
                    }
                }
                WaitOutcome::Ready(Ok(results)) => {
                    let mut count = 0;
                    for result in results {
                        count += 1;
                        if !sink(result) {
                            break;
                        }
                    }
                    debug!(pattern, count, "lookup delivered");
                    return DispatchOutcome::Delivered { count };
                }
                WaitOutcome::Ready(Err(e)) => {
                    warn!(pattern, error = %e, "lookup failed");
                    return DispatchOutcome::Failed(e);
                }
                WaitOutcome::Cancelled => return DispatchOutcome::Cancelled,
                WaitOutcome::Failed(reason) => {
                    warn!(pattern, %reason, "lookup task died");
                    return DispatchOutcome::Failed(SearchError::TaskFailed(reason));
                }
            }
        }
    }

    /// [`Self::filter_elements`] for plain background threads.
    ///
    /// Must not be called from inside the runtime.
    pub fn filter_elements_blocking<F>(
        &self,
        pattern: &str,
        everywhere: bool,
        cancel: &CancellationToken,
        sink: F,
    ) -> DispatchOutcome
    where
        F: FnMut(SearchResult) -> bool,
    {
        self.executor
            .handle()
            .block_on(self.filter_elements(pattern, everywhere, cancel, sink))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Result;
    use crate::models::{HighlightEntry, SearchFacet};
    use crate::request::Dialect;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Records requests and answers after `latency`
    struct StubSearcher {
        latency: Duration,
        results: Vec<SearchResult>,
        fail: bool,
        calls: AtomicUsize,
        seen: Mutex<Vec<SearchRequest>>,
    }

    impl StubSearcher {
        fn new(latency: Duration, results: Vec<SearchResult>) -> Arc<Self> {
            Arc::new(Self {
                latency,
                results,
                fail: false,
                calls: AtomicUsize::new(0),
                seen: Mutex::new(Vec::new()),
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                latency: Duration::ZERO,
                results: Vec::new(),
                fail: true,
                calls: AtomicUsize::new(0),
                seen: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl Searcher for StubSearcher {
        fn new_request(&self) -> SearchRequest {
            SearchRequest::new(Dialect::Generic)
        }

        async fn facets(&self, _request: &SearchRequest) -> Result<Vec<SearchFacet>> {
            Ok(Vec::new())
        }

        async fn results(&self, request: &SearchRequest) -> Result<Vec<SearchResult>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.seen.lock().unwrap().push(request.clone());
            tokio::time::sleep(self.latency).await;
            if self.fail {
                return Err(SearchError::transport("connection refused"));
            }
            Ok(self.results.clone())
        }

        async fn contents(&self, _facet_id: &str, _file_path: &str) -> Result<String> {
            Err(SearchError::Unsupported("contents"))
        }

        async fn highlights(&self, _: &str, _: &str, _: &str) -> Result<Vec<HighlightEntry>> {
            Err(SearchError::Unsupported("highlights"))
        }
    }

    fn files(names: &[&str]) -> Vec<SearchResult> {
        names.iter().map(|n| SearchResult::new(*n, *n)).collect()
    }

    fn dispatcher(searcher: Arc<StubSearcher>, debounce_ms: u64) -> DebouncedDispatcher {
        let config = SearchConfig {
            debounce_ms,
            poll_interval_ms: 10,
            ..Default::default()
        };
        DebouncedDispatcher::new(searcher, SearchExecutor::try_current().unwrap(), &config)
    }

    #[tokio::test]
    async fn test_immediate_cancellation_never_dispatches() {
        let stub = StubSearcher::new(Duration::ZERO, files(&["A.java"]));
        let dispatcher = dispatcher(stub.clone(), 20);
        let cancel = CancellationToken::new();
        cancel.cancel();

        let mut delivered = Vec::new();
        let outcome = dispatcher
            .filter_elements("A", false, &cancel, |r| {
                delivered.push(r);
                true
            })
            .await;

        assert!(matches!(outcome, DispatchOutcome::Cancelled));
        assert!(delivered.is_empty());
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(stub.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_cancel_during_debounce_drops_the_call() {
        let stub = StubSearcher::new(Duration::ZERO, files(&["A.java"]));
        let dispatcher = dispatcher(stub.clone(), 200);
        let cancel = CancellationToken::new();

        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(30)).await;
            trigger.cancel();
        });

        let outcome = dispatcher.filter_elements("A", false, &cancel, |_| true).await;
        assert!(matches!(outcome, DispatchOutcome::Cancelled));

        tokio::time::sleep(Duration::from_millis(250)).await;
        assert_eq!(stub.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_delivers_all_results_in_order() {
        let stub = StubSearcher::new(
            Duration::from_millis(10),
            files(&["A.java", "B.java", "C.java"]),
        );
        let dispatcher = dispatcher(stub.clone(), 5);
        let cancel = CancellationToken::new();

        let mut delivered = Vec::new();
        let outcome = dispatcher
            .filter_elements("A", false, &cancel, |r| {
                delivered.push(r.file_name().to_string());
                true
            })
            .await;

        assert!(matches!(outcome, DispatchOutcome::Delivered { count: 3 }));
        assert_eq!(delivered, ["A.java", "B.java", "C.java"]);
        assert_eq!(stub.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_sink_can_stop_delivery() {
        let stub = StubSearcher::new(Duration::ZERO, files(&["A.java", "B.java", "C.java"]));
        let dispatcher = dispatcher(stub, 0);
        let cancel = CancellationToken::new();

        let mut delivered = 0;
        let outcome = dispatcher
            .filter_elements("A", false, &cancel, |_| {
                delivered += 1;
                delivered < 2
            })
            .await;

        assert!(matches!(outcome, DispatchOutcome::Delivered { count: 2 }));
        assert_eq!(delivered, 2);
    }

    #[tokio::test]
    async fn test_empty_result_is_delivered_not_failed() {
        let stub = StubSearcher::new(Duration::ZERO, Vec::new());
        let dispatcher = dispatcher(stub, 0);

        let outcome = dispatcher
            .filter_elements("Nothing", true, &CancellationToken::new(), |_| true)
            .await;
        assert!(matches!(outcome, DispatchOutcome::Delivered { count: 0 }));
    }

    #[tokio::test]
    async fn test_backend_error_is_reported() {
        let dispatcher = dispatcher(StubSearcher::failing(), 0);

        let outcome = dispatcher
            .filter_elements("A", false, &CancellationToken::new(), |_| true)
            .await;
        assert!(matches!(
            outcome,
            DispatchOutcome::Failed(SearchError::Transport(_))
        ));
    }

    #[tokio::test]
    async fn test_pattern_parsing() {
        let stub = StubSearcher::new(Duration::ZERO, Vec::new());
        let dispatcher = dispatcher(stub.clone(), 0);

        dispatcher
            .filter_elements("Pool.java in commons", false, &CancellationToken::new(), |_| true)
            .await;
        dispatcher
            .filter_elements("Pool in ", true, &CancellationToken::new(), |_| true)
            .await;

        let seen = stub.seen.lock().unwrap();
        assert_eq!(seen[0].file_name(), Some("Pool.java"));
        assert_eq!(seen[0].facet(), Some("commons"));
        assert_eq!(seen[0].file_type(), Some("java"));

        assert_eq!(seen[1].file_name(), Some("Pool"));
        assert_eq!(seen[1].facet(), None);
        assert_eq!(seen[1].file_type(), None);
    }

    #[test]
    fn test_blocking_wrapper_runs_off_runtime() {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_all()
            .build()
            .unwrap();
        let stub = StubSearcher::new(Duration::from_millis(5), files(&["A.java"]));
        let config = SearchConfig {
            debounce_ms: 5,
            poll_interval_ms: 5,
            ..Default::default()
        };
        let dispatcher =
            DebouncedDispatcher::new(stub, SearchExecutor::new(runtime.handle().clone()), &config);

        let outcome =
            dispatcher.filter_elements_blocking("A", false, &CancellationToken::new(), |_| true);
        assert!(matches!(outcome, DispatchOutcome::Delivered { count: 1 }));
    }
}
