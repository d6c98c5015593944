//! Runs searcher calls on the runtime's worker pool and schedules delayed calls.
//!
//! A [`DelayedHandle`] can be cancelled before its delay elapses (the call never runs)
//! or while the call is in flight (the future is dropped at its next await point, which
//! releases whatever connection it held).

use crate::error::Result;
use crate::models::SearchResult;
use crate::request::SearchRequest;
use crate::searcher::Searcher;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::debug;

const PENDING: u8 = 0;
const RUNNING: u8 = 1;
const FINISHED: u8 = 2;
const CANCELLED: u8 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    /// Waiting for its delay to elapse
    Pending,
    Running,
    Finished,
    Cancelled,
}

impl From<u8> for TaskState {
    fn from(value: u8) -> Self {
        match value {
            PENDING => TaskState::Pending,
            RUNNING => TaskState::Running,
            FINISHED => TaskState::Finished,
            _ => TaskState::Cancelled,
        }
    }
}

#[derive(Debug)]
pub enum WaitOutcome<T> {
    Ready(T),
    /// Nothing yet, the task is still pending or running
    TimedOut,
    Cancelled,
    /// The task panicked or was torn down by the runtime
    Failed(String),
}

/// Handle to a call scheduled with [`SearchExecutor::schedule`].
///
/// Dropping the handle cancels the call, interrupting it if it already runs.
#[derive(Debug)]
pub struct DelayedHandle<T> {
    state: Arc<AtomicU8>,
    task: JoinHandle<Option<T>>,
    /// The task's output was already handed out by `wait_timeout`
    resolved: bool,
}

impl<T> DelayedHandle<T> {
    pub fn state(&self) -> TaskState {
        self.state.load(Ordering::SeqCst).into()
    }

    pub fn is_cancelled(&self) -> bool {
        self.state() == TaskState::Cancelled
    }

    /// Cancel the call.
    ///
    /// A pending call is always cancelled. A running call is only interrupted when
    /// `may_interrupt` is set. Returns whether this invocation cancelled it.
    pub fn cancel(&self, may_interrupt: bool) -> bool {
        let cancelled = match self.state.compare_exchange(
            PENDING,
            CANCELLED,
            Ordering::SeqCst,
            Ordering::SeqCst,
        ) {
            Ok(_) => true,
            Err(RUNNING) if may_interrupt => self
                .state
                .compare_exchange(RUNNING, CANCELLED, Ordering::SeqCst, Ordering::SeqCst)
                .is_ok(),
            Err(_) => false,
        };

        if cancelled {
            self.task.abort();
        }
        cancelled
    }

    /// Wait at most `timeout` for the call to resolve.
    ///
    /// Once it returned anything but `TimedOut`, later calls return `Cancelled` for a
    /// cancelled call and `Failed` otherwise.
    pub async fn wait_timeout(&mut self, timeout: Duration) -> WaitOutcome<T> {
        if self.resolved {
            return match self.state() {
                TaskState::Cancelled => WaitOutcome::Cancelled,
                _ => WaitOutcome::Failed("outcome already taken".to_string()),
            };
        }

        let outcome = match tokio::time::timeout(timeout, &mut self.task).await {
            Err(_) => return WaitOutcome::TimedOut,
            Ok(Ok(Some(value))) => WaitOutcome::Ready(value),
            Ok(Ok(None)) => WaitOutcome::Cancelled,
            Ok(Err(e)) if e.is_cancelled() => WaitOutcome::Cancelled,
            Ok(Err(e)) => WaitOutcome::Failed(e.to_string()),
        };
        self.resolved = true;
        outcome
    }
}

impl<T> Drop for DelayedHandle<T> {
    fn drop(&mut self) {
        if self.cancel(true) {
            debug!("delayed call dropped before it finished");
        }
    }
}

/// Thin wrapper over a tokio runtime handle.
///
/// The runtime's worker threads execute the network-bound searcher calls; delayed calls
/// ride on the runtime's timer.
#[derive(Debug, Clone)]
pub struct SearchExecutor {
    handle: Handle,
}

impl SearchExecutor {
    pub fn new(handle: Handle) -> Self {
        Self { handle }
    }

    /// Executor for the runtime the caller is running in, if any
    pub fn try_current() -> Option<Self> {
        Handle::try_current().ok().map(Self::new)
    }

    pub fn handle(&self) -> &Handle {
        &self.handle
    }

    pub fn spawn<F>(&self, future: F) -> JoinHandle<F::Output>
    where
        F: Future + Send + 'static,
        F::Output: Send + 'static,
    {
        self.handle.spawn(future)
    }

    /// Run `future` after `delay` unless cancelled first.
    pub fn schedule<F>(&self, delay: Duration, future: F) -> DelayedHandle<F::Output>
    where
        F: Future + Send + 'static,
        F::Output: Send + 'static,
    {
        let state = Arc::new(AtomicU8::new(PENDING));
        let task_state = state.clone();

        let task = self.handle.spawn(async move {
            tokio::time::sleep(delay).await;

            // A cancel that won the race must keep the call from starting.
            if task_state
                .compare_exchange(PENDING, RUNNING, Ordering::SeqCst, Ordering::SeqCst)
                .is_err()
            {
                return None;
            }

            let output = future.await;
            let _ = task_state.compare_exchange(
                RUNNING,
                FINISHED,
                Ordering::SeqCst,
                Ordering::SeqCst,
            );
            Some(output)
        });

        DelayedHandle {
            state,
            task,
            resolved: false,
        }
    }

    /// Schedule a results lookup after `delay`.
    pub fn schedule_results(
        &self,
        searcher: Arc<dyn Searcher>,
        request: SearchRequest,
        delay: Duration,
    ) -> DelayedHandle<Result<Vec<SearchResult>>> {
        debug!(request = %request, ?delay, "scheduling results lookup");
        self.schedule(delay, async move { searcher.results(&request).await })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicBool;

    #[tokio::test]
    async fn test_scheduled_call_runs_after_delay() {
        let executor = SearchExecutor::try_current().unwrap();
        let mut handle = executor.schedule(Duration::from_millis(20), async { 42 });

        assert_eq!(handle.state(), TaskState::Pending);
        match handle.wait_timeout(Duration::from_secs(2)).await {
            WaitOutcome::Ready(value) => assert_eq!(value, 42),
            other => panic!("unexpected outcome {other:?}"),
        }
        assert_eq!(handle.state(), TaskState::Finished);
    }

    #[tokio::test]
    async fn test_wait_after_resolution_does_not_poll_again() {
        let executor = SearchExecutor::try_current().unwrap();
        let mut handle = executor.schedule(Duration::ZERO, async { 7 });

        assert!(matches!(
            handle.wait_timeout(Duration::from_secs(2)).await,
            WaitOutcome::Ready(7)
        ));
        assert!(matches!(
            handle.wait_timeout(Duration::from_millis(10)).await,
            WaitOutcome::Failed(_)
        ));

        let mut cancelled = executor.schedule(Duration::from_millis(300), async { 1 });
        cancelled.cancel(true);
        for _ in 0..2 {
            assert!(matches!(
                cancelled.wait_timeout(Duration::from_secs(1)).await,
                WaitOutcome::Cancelled
            ));
        }
    }

    #[tokio::test]
    async fn test_dropping_handle_cancels_call() {
        let executor = SearchExecutor::try_current().unwrap();
        let ran = Arc::new(AtomicBool::new(false));
        let flag = ran.clone();

        let handle = executor.schedule(Duration::from_millis(30), async move {
            flag.store(true, Ordering::SeqCst);
        });
        drop(handle);

        tokio::time::sleep(Duration::from_millis(80)).await;
        assert!(!ran.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_wait_times_out_while_pending() {
        let executor = SearchExecutor::try_current().unwrap();
        let mut handle = executor.schedule(Duration::from_millis(300), async { 1 });

        assert!(matches!(
            handle.wait_timeout(Duration::from_millis(10)).await,
            WaitOutcome::TimedOut
        ));
        handle.cancel(true);
    }

    #[tokio::test]
    async fn test_cancel_before_run_never_executes() {
        let executor = SearchExecutor::try_current().unwrap();
        let ran = Arc::new(AtomicBool::new(false));
        let flag = ran.clone();

        let mut handle = executor.schedule(Duration::from_millis(30), async move {
            flag.store(true, Ordering::SeqCst);
        });

        assert!(handle.cancel(false));
        assert!(handle.is_cancelled());
        assert!(matches!(
            handle.wait_timeout(Duration::from_secs(1)).await,
            WaitOutcome::Cancelled
        ));

        tokio::time::sleep(Duration::from_millis(60)).await;
        assert!(!ran.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_running_call_needs_interrupt() {
        let executor = SearchExecutor::try_current().unwrap();
        let mut handle = executor.schedule(Duration::ZERO, async {
            tokio::time::sleep(Duration::from_secs(30)).await;
        });

        while handle.state() != TaskState::Running {
            tokio::time::sleep(Duration::from_millis(1)).await;
        }

        assert!(!handle.cancel(false));
        assert_eq!(handle.state(), TaskState::Running);
        assert!(handle.cancel(true));
        assert!(matches!(
            handle.wait_timeout(Duration::from_secs(1)).await,
            WaitOutcome::Cancelled
        ));
    }
}
