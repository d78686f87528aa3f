//! Circuit breaker configuration.

use crate::core::ConfigError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for a circuit breaker.
///
/// Immutable once handed to a breaker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BreakerConfig {
    /// Consecutive failures while closed before opening the circuit.
    pub failure_threshold: u32,

    /// How long the circuit stays open before a call may move it to half-open.
    pub recovery_time: Duration,

    /// Successes in half-open state required to close the circuit.
    pub half_open_max_requests: u32,

    /// Maximum duration of a single guarded operation.
    pub call_timeout: Duration,

    /// Abort timed-out async operations instead of detaching them.
    pub abort_on_timeout: bool,
}

impl Default for BreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            recovery_time: Duration::from_secs(30),
            half_open_max_requests: 1,
            call_timeout: Duration::from_secs(10),
            abort_on_timeout: false,
        }
    }
}

impl BreakerConfig {
    /// Creates a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the failure threshold.
    pub fn with_failure_threshold(mut self, threshold: u32) -> Self {
        self.failure_threshold = threshold.max(1);
        self
    }

    /// Sets the recovery time.
    pub fn with_recovery_time(mut self, duration: Duration) -> Self {
        self.recovery_time = duration;
        self
    }

    /// Sets the number of half-open successes needed to close.
    pub fn with_half_open_max_requests(mut self, max: u32) -> Self {
        self.half_open_max_requests = max.max(1);
        self
    }

    /// Sets the per-call timeout.
    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = timeout;
        self
    }

    /// Enables or disables aborting timed-out async operations.
    pub fn with_abort_on_timeout(mut self, abort: bool) -> Self {
        self.abort_on_timeout = abort;
        self
    }

    /// Creates a configuration that trips quickly and recovers cautiously.
    ///
    /// - Opens after 3 failures
    /// - Stays open for 60 seconds
    /// - Needs 3 half-open successes to close
    pub fn strict() -> Self {
        Self {
            failure_threshold: 3,
            recovery_time: Duration::from_secs(60),
            half_open_max_requests: 3,
            call_timeout: Duration::from_secs(5),
            abort_on_timeout: true,
        }
    }

    /// Creates a configuration optimized for availability.
    ///
    /// - Opens after 10 failures
    /// - Stays open for 10 seconds
    /// - Closes on the first half-open success
    pub fn high_availability() -> Self {
        Self {
            failure_threshold: 10,
            recovery_time: Duration::from_secs(10),
            half_open_max_requests: 1,
            call_timeout: Duration::from_secs(30),
            abort_on_timeout: false,
        }
    }

    /// Checks that the configuration can drive a breaker.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.failure_threshold == 0 {
            return Err(ConfigError::ZeroThreshold {
                field: "failure_threshold",
            });
        }
        if self.half_open_max_requests == 0 {
            return Err(ConfigError::ZeroThreshold {
                field: "half_open_max_requests",
            });
        }
        if self.call_timeout.is_zero() {
            return Err(ConfigError::ZeroTimeout);
        }
        Ok(())
    }

    /// Returns a copy with thresholds raised to at least 1.
    pub(crate) fn normalized(mut self) -> Self {
        self.failure_threshold = self.failure_threshold.max(1);
        self.half_open_max_requests = self.half_open_max_requests.max(1);
        self
    }
}
