//! Configuration for the operation executor.
//!
//! [`ResilienceConfig`] bundles the retry defaults, history capacity,
//! notification lifetime and event buffer size. Every value has a default
//! matching the client's production behavior, and configs can be read from
//! JSON with missing fields falling back to those defaults.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ResilienceResult};
use crate::logging::log_debug;
use crate::retry::RetryPolicy;

/// Default number of errors kept in the history buffer.
pub const DEFAULT_HISTORY_CAPACITY: usize = 50;

/// Default lifetime of a success notification.
pub const DEFAULT_NOTIFICATION_TTL: Duration = Duration::from_millis(5000);

/// Default capacity of the state-change broadcast channel.
pub const DEFAULT_EVENT_BUFFER: usize = 64;

/// Settings for an [`OperationExecutor`](crate::executor::OperationExecutor).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResilienceConfig {
    /// Defaults used by `execute_with_retry` when the caller does not override them
    pub retry: RetryPolicy,
    /// Maximum number of errors kept for diagnostics
    pub history_capacity: usize,
    /// How long a success notification stays visible without being dismissed
    pub notification_ttl: Duration,
    /// Capacity of the broadcast channel feeding subscribers
    pub event_buffer: usize,
}

impl Default for ResilienceConfig {
    fn default() -> Self {
        Self {
            retry: RetryPolicy::default(),
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            notification_ttl: DEFAULT_NOTIFICATION_TTL,
            event_buffer: DEFAULT_EVENT_BUFFER,
        }
    }
}

impl ResilienceConfig {
    /// Parse a JSON configuration document and validate it.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed JSON and
    /// [`ConfigError::InvalidValue`] when validation fails.
    pub fn from_json(json: &str) -> ResilienceResult<Self> {
        let config: Self = serde_json::from_str(json).map_err(ConfigError::parse)?;
        config.validate()?;
        log_debug!(
            max_retries = config.retry.max_retries,
            history_capacity = config.history_capacity,
            notification_ttl_ms = config.notification_ttl.as_millis(),
            "Loaded resilience configuration"
        );
        Ok(config)
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] if:
    /// - `retry.max_retries` is zero
    /// - `history_capacity` is zero
    /// - `notification_ttl` is zero
    /// - `event_buffer` is zero
    pub fn validate(&self) -> ResilienceResult<()> {
        if self.retry.max_retries == 0 {
            return Err(ConfigError::invalid_value(
                "retry.max_retries",
                "at least one attempt is required",
            ));
        }
        if self.history_capacity == 0 {
            return Err(ConfigError::invalid_value(
                "history_capacity",
                "history must hold at least one error",
            ));
        }
        if self.notification_ttl.is_zero() {
            return Err(ConfigError::invalid_value(
                "notification_ttl",
                "notifications must stay visible for a non-zero duration",
            ));
        }
        if self.event_buffer == 0 {
            return Err(ConfigError::invalid_value(
                "event_buffer",
                "broadcast channel capacity must be positive",
            ));
        }
        Ok(())
    }
}
