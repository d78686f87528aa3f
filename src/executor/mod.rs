//! Timeout-bounded execution.
//!
//! Guarded operations run on their own tokio task so the caller can stop
//! waiting at the deadline regardless of what the operation is doing. A
//! timed-out operation is detached, not cancelled, unless the executor is
//! configured to abort it.

mod timeout;

pub use timeout::TimeoutExecutor;
