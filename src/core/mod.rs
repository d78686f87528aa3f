//! Core types for the tripswitch library.
//!
//! - [`error`] - Call and configuration error types

pub mod error;

pub use error::{CallError, CallResult, ConfigError};
