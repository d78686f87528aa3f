//! Circuit breaker example guarding a flaky dependency.
//!
//! This example shows how to:
//! - Configure thresholds, recovery time and call timeout
//! - Watch the circuit open, reject calls, probe and close again
//! - Read the breaker's metrics
//!
//! Run with: cargo run --example flaky_dependency
//! Set RUST_LOG=tripswitch=debug to see state transitions.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;
use tripswitch::prelude::*;

#[derive(Debug)]
struct Unavailable(u32);

impl std::fmt::Display for Unavailable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "dependency unavailable (attempt {})", self.0)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("=== Circuit Breaker Example ===\n");

    let config = BreakerConfig::default()
        .with_failure_threshold(3)
        .with_recovery_time(Duration::from_millis(300))
        .with_half_open_max_requests(2)
        .with_call_timeout(Duration::from_millis(100));

    println!("Configuration:");
    println!("  Failure threshold: {}", config.failure_threshold);
    println!("  Recovery time: {:?}", config.recovery_time);
    println!("  Half-open successes to close: {}", config.half_open_max_requests);
    println!("  Call timeout: {:?}", config.call_timeout);
    println!();

    let breaker = CircuitBreaker::try_new(config)?;

    // The dependency fails its first four attempts, is slow on the fifth,
    // then recovers.
    let attempts = Arc::new(AtomicU32::new(0));

    for i in 1..=12 {
        let state = breaker.state().await;
        let attempts = Arc::clone(&attempts);

        let result = breaker
            .call(move || async move {
                let n = attempts.fetch_add(1, Ordering::SeqCst) + 1;
                match n {
                    1..=4 => Err(Unavailable(n)),
                    5 => {
                        tokio::time::sleep(Duration::from_millis(250)).await;
                        Ok(n)
                    }
                    _ => Ok(n),
                }
            })
            .await;

        print!("Call #{:>2} [{}] ", i, state);
        match result {
            Ok(Some(n)) => println!("succeeded on attempt {}", n),
            Ok(None) => println!("moved circuit to half-open"),
            Err(CallError::Blocked { retry_in }) => {
                println!("blocked, recovery in {:?}", retry_in)
            }
            Err(err) => println!("failed: {}", err),
        }

        tokio::time::sleep(Duration::from_millis(80)).await;
    }

    let metrics = breaker.metrics().await;
    println!("\nFinal state: {}", breaker.state().await);
    println!(
        "Metrics: {} total, {} success, {} failed ({} timed out), {} rejected, opened {} times",
        metrics.total_requests,
        metrics.successful_requests,
        metrics.failed_requests,
        metrics.timed_out_requests,
        metrics.rejected_requests,
        metrics.times_opened
    );

    Ok(())
}
