//! Circuit breaker state machine.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// The current state of a circuit breaker.
///
/// The counters that belong to each state live on the breaker itself; the
/// state is only a discriminator for dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BreakerState {
    /// Circuit is closed; calls pass through and failures are counted.
    #[default]
    Closed,

    /// Circuit is open; calls are rejected until the recovery time elapses.
    Open,

    /// Circuit is half-open; calls run as probes of the operation's health.
    HalfOpen,
}

impl BreakerState {
    /// Returns `true` if the circuit is closed.
    pub fn is_closed(&self) -> bool {
        matches!(self, Self::Closed)
    }

    /// Returns `true` if the circuit is open.
    pub fn is_open(&self) -> bool {
        matches!(self, Self::Open)
    }

    /// Returns `true` if the circuit is half-open.
    pub fn is_half_open(&self) -> bool {
        matches!(self, Self::HalfOpen)
    }

    /// Returns the name of the state.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Closed => "closed",
            Self::Open => "open",
            Self::HalfOpen => "half_open",
        }
    }
}

impl fmt::Display for BreakerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Metrics about circuit breaker behavior.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreakerMetrics {
    /// Total number of calls, including rejected ones.
    pub total_requests: u64,
    /// Number of calls whose operation succeeded.
    pub successful_requests: u64,
    /// Number of calls that failed, including timeouts.
    pub failed_requests: u64,
    /// Number of failed calls that were timeouts.
    pub timed_out_requests: u64,
    /// Number of calls rejected due to an open circuit.
    pub rejected_requests: u64,
    /// Number of open to half-open transitions.
    pub probes_started: u64,
    /// Number of times the circuit has opened.
    pub times_opened: u64,
    /// Number of times the circuit has closed after being tripped.
    pub times_closed: u64,
}

impl BreakerMetrics {
    /// Creates new empty metrics.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a successful call.
    pub fn record_success(&mut self) {
        self.total_requests += 1;
        self.successful_requests += 1;
    }

    /// Records a failed call.
    pub fn record_failure(&mut self, timed_out: bool) {
        self.total_requests += 1;
        self.failed_requests += 1;
        if timed_out {
            self.timed_out_requests += 1;
        }
    }

    /// Records a rejected call.
    pub fn record_rejected(&mut self) {
        self.total_requests += 1;
        self.rejected_requests += 1;
    }

    /// Records the call that moved the circuit to half-open.
    pub fn record_probe(&mut self) {
        self.total_requests += 1;
        self.probes_started += 1;
    }

    /// Records that the circuit opened.
    pub fn record_opened(&mut self) {
        self.times_opened += 1;
    }

    /// Records that the circuit closed.
    pub fn record_closed(&mut self) {
        self.times_closed += 1;
    }

    /// Returns the success rate (0.0 to 1.0) over calls that ran the operation.
    pub fn success_rate(&self) -> f64 {
        let executed = self.successful_requests + self.failed_requests;
        if executed == 0 {
            return 1.0;
        }
        self.successful_requests as f64 / executed as f64
    }

    /// Returns the failure rate (0.0 to 1.0) over calls that ran the operation.
    pub fn failure_rate(&self) -> f64 {
        let executed = self.successful_requests + self.failed_requests;
        if executed == 0 {
            return 0.0;
        }
        self.failed_requests as f64 / executed as f64
    }
}

/// A point-in-time view of a breaker.
#[derive(Debug, Clone, PartialEq)]
pub struct BreakerSnapshot {
    /// The active state.
    pub state: BreakerState,
    /// Consecutive failures while closed.
    pub failure_count: u32,
    /// Successes while half-open.
    pub half_open_successes: u32,
    /// Time since the most recent failure, if there has been one.
    pub since_last_failure: Option<Duration>,
    /// Lifetime counters.
    pub metrics: BreakerMetrics,
}
