//! # Tripswitch
//!
//! An async circuit breaker with per-call timeouts for guarding calls to
//! unreliable dependencies.
//!
//! ## Overview
//!
//! A [`CircuitBreaker`] sits in front of one logical operation, such as a
//! remote call, and:
//!
//! - Runs each call on its own task, bounded by a timeout
//! - Counts consecutive failures and opens the circuit at a threshold
//! - Rejects calls while open, then probes again after a recovery period
//! - Closes once enough probe calls succeed
//!
//! The breaker never retries; layer retry policy on top if needed.
//!
//! ## Quick Start
//!
//! ```rust
//! use tripswitch::{BreakerConfig, CallError, CircuitBreaker};
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() {
//!     let breaker = CircuitBreaker::new(
//!         BreakerConfig::default()
//!             .with_failure_threshold(3)
//!             .with_recovery_time(Duration::from_secs(5))
//!             .with_call_timeout(Duration::from_millis(500)),
//!     );
//!
//!     match breaker.call(|| async { Ok::<_, std::io::Error>(42) }).await {
//!         Ok(Some(value)) => println!("got {value}"),
//!         Ok(None) => println!("circuit moved to half-open"),
//!         Err(CallError::Blocked { retry_in }) => println!("blocked for {retry_in:?}"),
//!         Err(err) => println!("call failed: {err}"),
//!     }
//! }
//! ```
//!
//! ## Architecture
//!
//! - **Core**: Error types
//! - **Executor**: Timeout-bounded execution on a spawned task
//! - **Circuit Breaker**: State machine, configuration and metrics

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod circuit_breaker;
pub mod core;
pub mod executor;

// Re-export commonly used types at the crate root
pub use crate::circuit_breaker::{
    BreakerConfig, BreakerMetrics, BreakerSnapshot, BreakerState, CircuitBreaker,
};
pub use crate::core::{CallError, CallResult, ConfigError};
pub use crate::executor::TimeoutExecutor;

/// Prelude module for convenient imports.
///
/// ```rust
/// use tripswitch::prelude::*;
/// ```
pub mod prelude {
    pub use crate::circuit_breaker::{BreakerConfig, BreakerState, CircuitBreaker};
    pub use crate::core::{CallError, CallResult, ConfigError};
    pub use crate::executor::TimeoutExecutor;
}
