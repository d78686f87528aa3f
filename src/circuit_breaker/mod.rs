//! Circuit breaker controller.
//!
//! The circuit breaker pattern prevents cascading failures by refusing to
//! call an operation that keeps failing, then probing it again after a
//! recovery period.
//!
//! ## States
//!
//! - **Closed**: Normal operation; calls pass through.
//! - **Open**: The operation is failing; calls are rejected immediately.
//! - **Half-Open**: Calls run as probes to see if the operation recovered.
//!
//! ## Transitions
//!
//! ```text
//! Closed   -> Open      consecutive failures reach failure_threshold
//! Closed   -> Closed    success (failure count reset)
//! Open     -> HalfOpen  recovery_time elapsed since the last failure
//! Open     -> Open      recovery_time not elapsed (call blocked)
//! HalfOpen -> Open      any failure
//! HalfOpen -> Closed    successes reach half_open_max_requests
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use tripswitch::circuit_breaker::{BreakerConfig, CircuitBreaker};
//! use std::time::Duration;
//!
//! let config = BreakerConfig::default()
//!     .with_failure_threshold(5)
//!     .with_recovery_time(Duration::from_secs(30));
//!
//! let breaker = CircuitBreaker::new(config);
//! let response = breaker.call(|| client.fetch()).await;
//! ```

mod breaker;
mod config;
mod state;

pub use breaker::CircuitBreaker;
pub use config::BreakerConfig;
pub use state::{BreakerMetrics, BreakerSnapshot, BreakerState};
