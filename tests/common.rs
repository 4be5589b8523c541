//! Test helper utilities for resilient-ops integration tests
//!
//! This module provides reusable fixtures and helper functions shared
//! across integration test files.
//!
//! IMPORTANT: These helpers are test-only and should NEVER be used in production code.

// Allow dead code in test utilities - functions are used across different test files
#![allow(dead_code)]

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use resilient_ops::{OperationExecutor, RawError, ResilienceConfig, RetryPolicy};

/// Executor with short delays so retry paths stay fast without a paused clock.
pub fn create_fast_executor() -> OperationExecutor {
    let config = ResilienceConfig {
        retry: RetryPolicy {
            max_retries: 3,
            delay: Duration::from_millis(5),
            exponential_backoff: true,
        },
        notification_ttl: Duration::from_millis(50),
        ..ResilienceConfig::default()
    };
    OperationExecutor::new(config)
}

/// Counts attempts and fails with `failure` until `successes_after` attempts have been made.
#[derive(Clone)]
pub struct FlakyOperation {
    attempts: Arc<AtomicU32>,
    successes_after: u32,
    failure: RawError,
}

impl FlakyOperation {
    pub fn new(successes_after: u32, failure: RawError) -> Self {
        Self {
            attempts: Arc::new(AtomicU32::new(0)),
            successes_after,
            failure,
        }
    }

    /// Never succeeds.
    pub fn always_failing(failure: RawError) -> Self {
        Self::new(u32::MAX, failure)
    }

    pub async fn run(&self) -> Result<&'static str, RawError> {
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst);
        if attempt < self.successes_after {
            Err(self.failure.clone())
        } else {
            Ok("done")
        }
    }

    pub fn attempts(&self) -> u32 {
        self.attempts.load(Ordering::SeqCst)
    }
}
