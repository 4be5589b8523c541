//! Retry logic with exponential backoff
//!
//! This module provides bounded retry for asynchronous units of work:
//! - Exponential backoff: 1s, 2s, 4s, ... (or a flat delay when disabled)
//! - Retry decisions driven by failure classification: non-retryable
//!   failures are returned immediately
//! - Optional per-attempt progress reporting for an operation key
//!
//! There is no timeout and no cancellation at this layer; a unit of work
//! that never completes keeps the retry loop waiting.

use std::future::Future;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tokio::time::sleep;

use crate::classifier::ErrorClassifier;
use crate::error::Failure;
use crate::logging::{log_debug, log_error, log_warn};
use crate::state::loading::{LoadingGuard, LoadingStateRegistry, OperationKey};

/// Retry policy for operations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Total number of attempts, including the first
    pub max_retries: u32,
    /// Delay before the first retry
    pub delay: Duration,
    /// Double the delay after every failed attempt
    pub exponential_backoff: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            delay: Duration::from_millis(1000),
            exponential_backoff: true,
        }
    }
}

impl RetryPolicy {
    /// Delay to wait after the failed attempt with the given zero-based index.
    ///
    /// `delay * 2^attempt` with exponential backoff, `delay` otherwise.
    /// Saturates instead of overflowing.
    pub fn calculate_delay(&self, attempt: u32) -> Duration {
        if !self.exponential_backoff {
            return self.delay;
        }
        let multiplier = 2_u32.checked_pow(attempt).unwrap_or(u32::MAX);
        self.delay.saturating_mul(multiplier)
    }
}

/// Per-call options for [`execute_with_retry`](crate::OperationExecutor::execute_with_retry).
#[derive(Debug, Clone, Default)]
pub struct RetryOptions {
    pub policy: RetryPolicy,
    /// Key whose loading state and progress are updated per attempt
    pub operation: Option<OperationKey>,
    /// Context attached to the classification used for the retry decision
    pub error_context: Option<String>,
}

impl RetryOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policy(policy: RetryPolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    pub fn max_retries(mut self, max_retries: u32) -> Self {
        self.policy.max_retries = max_retries;
        self
    }

    pub fn delay(mut self, delay: Duration) -> Self {
        self.policy.delay = delay;
        self
    }

    pub fn exponential_backoff(mut self, enabled: bool) -> Self {
        self.policy.exponential_backoff = enabled;
        self
    }

    pub fn operation(mut self, key: impl Into<OperationKey>) -> Self {
        self.operation = Some(key.into());
        self
    }

    pub fn error_context(mut self, context: impl Into<String>) -> Self {
        self.error_context = Some(context.into());
        self
    }
}

/// Drives the attempts of a single retried operation.
#[derive(Debug)]
pub(crate) struct RetryExecutor<'a> {
    pub(crate) options: RetryOptions,
    pub(crate) classifier: ErrorClassifier,
    pub(crate) loading: &'a LoadingStateRegistry,
}

impl<'a> RetryExecutor<'a> {
    pub(crate) fn new(
        options: RetryOptions,
        classifier: ErrorClassifier,
        loading: &'a LoadingStateRegistry,
    ) -> Self {
        Self {
            options,
            classifier,
            loading,
        }
    }

    /// Run `operation` until it succeeds, fails with a non-retryable error,
    /// or runs out of attempts. The last error is returned unchanged.
    pub(crate) async fn execute<F, Fut, T, E>(&self, operation: F) -> Result<T, E>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Failure,
    {
        let start_time = Instant::now();
        let max_retries = self.max_attempts();

        let guard = self
            .options
            .operation
            .as_ref()
            .map(|key| LoadingGuard::start(self.loading, key));

        let mut attempt = 0;
        loop {
            if let Some(guard) = &guard {
                guard.progress(f64::from(attempt) / f64::from(max_retries) * 100.0);
            }

            log_debug!(
                operation = ?self.options.operation,
                attempt = attempt,
                max_retries = max_retries,
                "Executing operation with retry logic"
            );

            let error = match operation().await {
                Ok(value) => {
                    log_debug!(
                        operation = ?self.options.operation,
                        attempt = attempt,
                        duration_ms = start_time.elapsed().as_millis(),
                        "Operation succeeded"
                    );
                    return Ok(value);
                }
                Err(error) => error,
            };

            let classified = self
                .classifier
                .classify(&error, self.options.error_context.as_deref());

            if !classified.retryable() {
                log_debug!(
                    operation = ?self.options.operation,
                    attempt = attempt,
                    category = %classified.category(),
                    "Failure is not retryable, giving up"
                );
                return Err(error);
            }

            if attempt + 1 >= max_retries {
                log_error!(
                    operation = ?self.options.operation,
                    attempts = attempt + 1,
                    total_duration_ms = start_time.elapsed().as_millis(),
                    category = %classified.category(),
                    "Operation failed after all retry attempts"
                );
                return Err(error);
            }

            let delay = self.options.policy.calculate_delay(attempt);
            log_debug!(
                operation = ?self.options.operation,
                attempt = attempt,
                max_retries = max_retries,
                delay_ms = delay.as_millis(),
                "Operation failed, retrying after delay"
            );
            sleep(delay).await;
            attempt += 1;
        }
    }

    fn max_attempts(&self) -> u32 {
        if self.options.policy.max_retries == 0 {
            log_warn!(
                operation = ?self.options.operation,
                "Retry requested with zero attempts, running once"
            );
            return 1;
        }
        self.options.policy.max_retries
    }
}
