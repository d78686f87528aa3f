//! Error types for the tripswitch library.
//!
//! Every guarded call resolves to either the operation's value or a
//! [`CallError`]. The breaker itself never panics and never retries.

use std::time::Duration;
use thiserror::Error;

/// The error returned by a guarded call.
///
/// `E` is the wrapped operation's own error type. It is carried verbatim in
/// [`CallError::Operation`] so callers can match on it without downcasting.
#[derive(Debug, Error)]
pub enum CallError<E> {
    /// The wrapped operation itself returned an error.
    ///
    /// Displays exactly as the operation's own error.
    #[error("{0}")]
    Operation(E),

    /// The operation did not finish within the configured call timeout.
    #[error("request timed out after {timeout:?}")]
    TimedOut {
        /// The timeout that elapsed.
        timeout: Duration,
    },

    /// The circuit is open and the recovery time has not elapsed yet.
    #[error("request blocked: circuit open, recovery in {retry_in:?}")]
    Blocked {
        /// Time left until the next call is allowed to probe.
        retry_in: Duration,
    },

    /// The task running the operation panicked or was cancelled.
    #[error("internal error: {message}")]
    Internal {
        /// Description of the internal fault.
        message: String,
    },
}

impl<E> CallError<E> {
    /// Creates a `TimedOut` error.
    pub fn timed_out(timeout: Duration) -> Self {
        Self::TimedOut { timeout }
    }

    /// Creates a `Blocked` error.
    pub fn blocked(retry_in: Duration) -> Self {
        Self::Blocked { retry_in }
    }

    /// Creates an `Internal` error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns `true` if the call was rejected by an open circuit.
    pub fn is_blocked(&self) -> bool {
        matches!(self, Self::Blocked { .. })
    }

    /// Returns `true` if the call timed out.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::TimedOut { .. })
    }

    /// Returns `true` if the wrapped operation returned its own error.
    pub fn is_operation(&self) -> bool {
        matches!(self, Self::Operation(_))
    }

    /// Returns `true` if this outcome counts toward tripping the breaker.
    ///
    /// Everything except a rejection does: a blocked call never reached the
    /// operation.
    pub fn counts_as_failure(&self) -> bool {
        !self.is_blocked()
    }

    /// Returns a short, stable name for the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Operation(_) => "operation",
            Self::TimedOut { .. } => "timed_out",
            Self::Blocked { .. } => "blocked",
            Self::Internal { .. } => "internal",
        }
    }

    /// Returns the operation's own error, if that is what this is.
    pub fn into_operation(self) -> Option<E> {
        match self {
            Self::Operation(err) => Some(err),
            _ => None,
        }
    }

    /// Returns a reference to the operation's own error, if any.
    pub fn operation(&self) -> Option<&E> {
        match self {
            Self::Operation(err) => Some(err),
            _ => None,
        }
    }
}

/// Error type for invalid breaker configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A threshold that must be at least 1 was zero.
    #[error("{field} must be at least 1")]
    ZeroThreshold {
        /// Name of the offending field.
        field: &'static str,
    },

    /// The call timeout was zero, which would fail every call.
    #[error("call_timeout must be greater than zero")]
    ZeroTimeout,
}

/// A specialized `Result` type for guarded calls.
///
/// `Ok(None)` is only produced by the call that moves an open circuit to
/// half-open; that call does not run the operation.
pub type CallResult<T, E> = Result<Option<T>, CallError<E>>;
