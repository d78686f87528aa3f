//! Circuit breaker implementation.

use crate::circuit_breaker::config::BreakerConfig;
use crate::circuit_breaker::state::{BreakerMetrics, BreakerSnapshot, BreakerState};
use crate::core::{CallError, CallResult, ConfigError};
use crate::executor::TimeoutExecutor;

use std::fmt;
use std::future::Future;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

/// A circuit breaker guarding one logical operation.
///
/// The breaker tracks consecutive failures and stops calling the operation
/// once it appears unhealthy.
///
/// # States
///
/// - **Closed**: Normal operation. Calls run, consecutive failures are counted.
/// - **Open**: The operation is failing. Calls are rejected immediately until
///   the recovery time has passed since the last failure.
/// - **Half-Open**: Probation. Calls run; any failure reopens the circuit and
///   enough successes close it.
///
/// Every call holds the breaker's lock for its full duration, including the
/// time spent waiting on the operation, so guarded calls never interleave.
///
/// # Example
///
/// ```rust
/// use tripswitch::{BreakerConfig, CircuitBreaker};
/// use std::time::Duration;
///
/// # #[tokio::main]
/// # async fn main() {
/// let config = BreakerConfig::default()
///     .with_failure_threshold(3)
///     .with_call_timeout(Duration::from_millis(200));
/// let breaker = CircuitBreaker::new(config);
///
/// let value = breaker
///     .call(|| async { Ok::<_, std::io::Error>("ok") })
///     .await
///     .unwrap();
/// assert_eq!(value, Some("ok"));
/// # }
/// ```
pub struct CircuitBreaker {
    /// State and counters, guarded for the whole of each call.
    inner: Mutex<Inner>,
    /// Configuration.
    config: BreakerConfig,
    /// Runs operations under the call timeout.
    executor: TimeoutExecutor,
}

#[derive(Debug)]
struct Inner {
    state: BreakerState,
    failure_count: u32,
    last_failure: Option<Instant>,
    half_open_successes: u32,
    metrics: BreakerMetrics,
}

impl Inner {
    fn new() -> Self {
        Self {
            state: BreakerState::Closed,
            failure_count: 0,
            last_failure: None,
            half_open_successes: 0,
            metrics: BreakerMetrics::new(),
        }
    }

    fn open(&mut self, at: Instant) {
        self.state = BreakerState::Open;
        self.last_failure = Some(at);
        self.metrics.record_opened();
    }

    fn half_open(&mut self) {
        self.state = BreakerState::HalfOpen;
        self.half_open_successes = 0;
        self.failure_count = 0;
    }

    fn close(&mut self) {
        self.state = BreakerState::Closed;
        self.failure_count = 0;
        self.half_open_successes = 0;
    }
}

impl CircuitBreaker {
    /// Creates a new circuit breaker with the given configuration.
    ///
    /// Zero thresholds are raised to 1. Use [`try_new`](Self::try_new) to
    /// reject them instead.
    pub fn new(config: BreakerConfig) -> Self {
        let config = config.normalized();
        let executor = TimeoutExecutor::new(config.call_timeout)
            .with_abort_on_timeout(config.abort_on_timeout);
        Self {
            inner: Mutex::new(Inner::new()),
            config,
            executor,
        }
    }

    /// Creates a new circuit breaker, rejecting an invalid configuration.
    pub fn try_new(config: BreakerConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::new(config))
    }

    /// Creates a circuit breaker from its four settings.
    pub fn with_settings(
        failure_threshold: u32,
        recovery_time: Duration,
        half_open_max_requests: u32,
        call_timeout: Duration,
    ) -> Self {
        Self::new(
            BreakerConfig::new()
                .with_failure_threshold(failure_threshold)
                .with_recovery_time(recovery_time)
                .with_half_open_max_requests(half_open_max_requests)
                .with_call_timeout(call_timeout),
        )
    }

    /// Creates a new circuit breaker with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(BreakerConfig::default())
    }

    /// Returns a reference to the configuration.
    pub fn config(&self) -> &BreakerConfig {
        &self.config
    }

    /// Runs an async operation through the breaker.
    ///
    /// Returns `Ok(Some(value))` on success and `Ok(None)` for the call that
    /// moves an open circuit to half-open, which does not run the operation.
    pub async fn call<F, Fut, T, E>(&self, operation: F) -> CallResult<T, E>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
        T: Send + 'static,
        E: Send + 'static,
    {
        self.dispatch(|executor| executor.run(operation)).await
    }

    /// Runs a synchronous operation through the breaker.
    ///
    /// The operation runs on tokio's blocking pool; otherwise this behaves
    /// exactly like [`call`](Self::call).
    pub async fn call_blocking<F, T, E>(&self, operation: F) -> CallResult<T, E>
    where
        F: FnOnce() -> Result<T, E> + Send + 'static,
        T: Send + 'static,
        E: Send + 'static,
    {
        self.dispatch(|executor| executor.run_blocking(operation)).await
    }

    /// Returns the current state.
    pub async fn state(&self) -> BreakerState {
        self.inner.lock().await.state
    }

    /// Returns a copy of the current metrics.
    pub async fn metrics(&self) -> BreakerMetrics {
        self.inner.lock().await.metrics.clone()
    }

    /// Returns the state, counters and metrics as one consistent view.
    pub async fn snapshot(&self) -> BreakerSnapshot {
        let inner = self.inner.lock().await;
        BreakerSnapshot {
            state: inner.state,
            failure_count: inner.failure_count,
            half_open_successes: inner.half_open_successes,
            since_last_failure: inner.last_failure.map(|at| at.elapsed()),
            metrics: inner.metrics.clone(),
        }
    }

    /// Forces the circuit into the open state.
    ///
    /// The recovery time is measured from now.
    pub async fn force_open(&self) {
        let mut inner = self.inner.lock().await;
        let from = inner.state;
        inner.open(Instant::now());
        tracing::warn!(from = %from, "Circuit breaker forced open");
    }

    /// Forces the circuit into the closed state.
    pub async fn force_close(&self) {
        let mut inner = self.inner.lock().await;
        let from = inner.state;
        inner.close();
        inner.metrics.record_closed();
        tracing::debug!(from = %from, "Circuit breaker forced closed");
    }

    /// Resets the circuit breaker state and metrics.
    pub async fn reset(&self) {
        *self.inner.lock().await = Inner::new();
    }

    async fn dispatch<'a, R, Fut, T, E>(&'a self, run: R) -> CallResult<T, E>
    where
        R: FnOnce(&'a TimeoutExecutor) -> Fut,
        Fut: Future<Output = Result<T, CallError<E>>>,
    {
        let mut inner = self.inner.lock().await;

        match inner.state {
            BreakerState::Closed => {
                let outcome = run(&self.executor).await;
                self.handle_closed(&mut inner, outcome).map(Some)
            }
            BreakerState::Open => self.handle_open(&mut inner),
            BreakerState::HalfOpen => {
                let outcome = run(&self.executor).await;
                self.handle_half_open(&mut inner, outcome).map(Some)
            }
        }
    }

    fn handle_closed<T, E>(
        &self,
        inner: &mut Inner,
        outcome: Result<T, CallError<E>>,
    ) -> Result<T, CallError<E>> {
        match outcome {
            Ok(value) => {
                inner.failure_count = 0;
                inner.metrics.record_success();
                Ok(value)
            }
            Err(err) => {
                let now = Instant::now();
                inner.failure_count = inner.failure_count.saturating_add(1);
                inner.last_failure = Some(now);
                inner.metrics.record_failure(err.is_timeout());

                if inner.failure_count >= self.config.failure_threshold {
                    tracing::warn!(
                        failure_count = inner.failure_count,
                        threshold = self.config.failure_threshold,
                        error_kind = err.kind(),
                        "Circuit breaker opened"
                    );
                    inner.open(now);
                }
                Err(err)
            }
        }
    }

    fn handle_open<T, E>(&self, inner: &mut Inner) -> CallResult<T, E> {
        let elapsed = inner
            .last_failure
            .map(|at| at.elapsed())
            .unwrap_or(Duration::MAX);

        if elapsed > self.config.recovery_time {
            inner.half_open();
            inner.metrics.record_probe();
            tracing::debug!(
                from = %BreakerState::Open,
                to = %BreakerState::HalfOpen,
                "Circuit breaker half-open"
            );
            return Ok(None);
        }

        inner.metrics.record_rejected();
        Err(CallError::blocked(self.config.recovery_time - elapsed))
    }

    fn handle_half_open<T, E>(
        &self,
        inner: &mut Inner,
        outcome: Result<T, CallError<E>>,
    ) -> Result<T, CallError<E>> {
        match outcome {
            Ok(value) => {
                inner.metrics.record_success();
                inner.half_open_successes = inner.half_open_successes.saturating_add(1);

                if inner.half_open_successes >= self.config.half_open_max_requests {
                    inner.close();
                    inner.metrics.record_closed();
                    tracing::debug!(
                        from = %BreakerState::HalfOpen,
                        to = %BreakerState::Closed,
                        "Circuit breaker closed"
                    );
                }
                Ok(value)
            }
            Err(err) => {
                inner.metrics.record_failure(err.is_timeout());
                inner.open(Instant::now());
                tracing::warn!(
                    from = %BreakerState::HalfOpen,
                    error_kind = err.kind(),
                    "Circuit breaker reopened"
                );
                Err(err)
            }
        }
    }
}

impl Default for CircuitBreaker {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl fmt::Debug for CircuitBreaker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut debug = f.debug_struct("CircuitBreaker");
        match self.inner.try_lock() {
            Ok(inner) => debug.field("state", &inner.state),
            Err(_) => debug.field("state", &format_args!("<locked>")),
        };
        debug.field("config", &self.config).finish()
    }
}
