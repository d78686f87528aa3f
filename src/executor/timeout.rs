//! Timeout-bounded execution of guarded operations.

use crate::core::CallError;

use std::future::Future;
use std::time::Duration;
use tokio::task::{JoinError, JoinHandle};

/// Runs operations on their own tokio task with an upper bound on duration.
///
/// The operation is spawned so that the waiting side observes the deadline
/// even when the operation blocks or never yields. When the deadline fires
/// the wait ends with [`CallError::TimedOut`]. By default the task is left
/// running in the background and its eventual result is discarded; set
/// [`with_abort_on_timeout`](Self::with_abort_on_timeout) to abort async
/// operations instead.
///
/// # Example
///
/// ```rust
/// use tripswitch::executor::TimeoutExecutor;
/// use std::time::Duration;
///
/// # #[tokio::main]
/// # async fn main() {
/// let executor = TimeoutExecutor::new(Duration::from_millis(50));
/// let value = executor
///     .run(|| async { Ok::<_, std::io::Error>(42) })
///     .await
///     .unwrap();
/// assert_eq!(value, 42);
/// # }
/// ```
#[derive(Debug, Clone, Copy)]
pub struct TimeoutExecutor {
    timeout: Duration,
    abort_on_timeout: bool,
}

impl TimeoutExecutor {
    /// Creates an executor that waits at most `timeout` per operation.
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            abort_on_timeout: false,
        }
    }

    /// Aborts the spawned task when the timeout fires.
    ///
    /// Only async operations can be aborted, and only at an `.await` point.
    /// Blocking operations always run to completion.
    pub fn with_abort_on_timeout(mut self, abort: bool) -> Self {
        self.abort_on_timeout = abort;
        self
    }

    /// Returns the configured timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Returns whether timed-out async operations are aborted.
    pub fn aborts_on_timeout(&self) -> bool {
        self.abort_on_timeout
    }

    /// Runs an async operation, bounded by the timeout.
    pub async fn run<F, Fut, T, E>(&self, operation: F) -> Result<T, CallError<E>>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
        T: Send + 'static,
        E: Send + 'static,
    {
        let handle = tokio::spawn(async move { operation().await });
        self.wait(handle, self.abort_on_timeout).await
    }

    /// Runs a synchronous operation on the blocking pool, bounded by the timeout.
    pub async fn run_blocking<F, T, E>(&self, operation: F) -> Result<T, CallError<E>>
    where
        F: FnOnce() -> Result<T, E> + Send + 'static,
        T: Send + 'static,
        E: Send + 'static,
    {
        let handle = tokio::task::spawn_blocking(operation);
        self.wait(handle, false).await
    }

    async fn wait<T, E>(
        &self,
        mut handle: JoinHandle<Result<T, E>>,
        abort: bool,
    ) -> Result<T, CallError<E>> {
        match tokio::time::timeout(self.timeout, &mut handle).await {
            Ok(Ok(outcome)) => outcome.map_err(CallError::Operation),
            Ok(Err(join_error)) => Err(join_failure(join_error)),
            Err(_) => {
                tracing::debug!(
                    timeout = ?self.timeout,
                    abort,
                    "Guarded operation timed out"
                );
                if abort {
                    handle.abort();
                }
                // Dropping the handle detaches the task.
                Err(CallError::timed_out(self.timeout))
            }
        }
    }
}

fn join_failure<E>(error: JoinError) -> CallError<E> {
    if error.is_panic() {
        CallError::internal("guarded operation panicked")
    } else {
        CallError::internal("guarded operation was cancelled")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_run_returns_value() {
        let executor = TimeoutExecutor::new(Duration::from_millis(100));
        let result = executor.run(|| async { Ok::<_, String>("pong") }).await;
        assert_eq!(result.unwrap(), "pong");
    }

    #[tokio::test]
    async fn test_run_propagates_operation_error() {
        let executor = TimeoutExecutor::new(Duration::from_millis(100));
        let result = executor
            .run(|| async { Err::<(), _>("refused".to_string()) })
            .await;

        match result {
            Err(CallError::Operation(msg)) => assert_eq!(msg, "refused"),
            other => panic!("expected operation error, got {:?}", other),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_times_out() {
        let executor = TimeoutExecutor::new(Duration::from_millis(50));
        let result = executor
            .run(|| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Ok::<_, String>(())
            })
            .await;

        match result {
            Err(CallError::TimedOut { timeout }) => {
                assert_eq!(timeout, Duration::from_millis(50))
            }
            other => panic!("expected timeout, got {:?}", other),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_timed_out_task_keeps_running() {
        let finished = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&finished);

        let executor = TimeoutExecutor::new(Duration::from_millis(50));
        let result = executor
            .run(move || async move {
                tokio::time::sleep(Duration::from_millis(200)).await;
                flag.store(true, Ordering::SeqCst);
                Ok::<_, String>(())
            })
            .await;
        assert!(result.unwrap_err().is_timeout());
        assert!(!finished.load(Ordering::SeqCst));

        tokio::time::sleep(Duration::from_millis(300)).await;
        assert!(finished.load(Ordering::SeqCst));
    }

    #[tokio::test(start_paused = true)]
    async fn test_abort_on_timeout_stops_task() {
        let finished = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&finished);

        let executor =
            TimeoutExecutor::new(Duration::from_millis(50)).with_abort_on_timeout(true);
        let result = executor
            .run(move || async move {
                tokio::time::sleep(Duration::from_millis(200)).await;
                flag.store(true, Ordering::SeqCst);
                Ok::<_, String>(())
            })
            .await;
        assert!(result.unwrap_err().is_timeout());

        tokio::time::sleep(Duration::from_millis(300)).await;
        assert!(!finished.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_panic_becomes_internal_error() {
        let executor = TimeoutExecutor::new(Duration::from_secs(1));
        let result = executor
            .run(|| async {
                if true {
                    panic!("boom");
                }
                Ok::<(), String>(())
            })
            .await;

        match result {
            Err(CallError::Internal { message }) => assert!(message.contains("panicked")),
            other => panic!("expected internal error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_run_blocking_returns_value() {
        let executor = TimeoutExecutor::new(Duration::from_secs(1));
        let result = executor.run_blocking(|| Ok::<_, String>(7)).await;
        assert_eq!(result.unwrap(), 7);
    }

    #[tokio::test]
    async fn test_run_blocking_times_out() {
        let executor = TimeoutExecutor::new(Duration::from_millis(20));
        let result = executor
            .run_blocking(|| {
                std::thread::sleep(Duration::from_millis(300));
                Ok::<_, String>(())
            })
            .await;
        assert!(result.unwrap_err().is_timeout());
    }
}
