//! Operation execution with error handling, retry and notifications.
//!
//! [`OperationExecutor`] is the entry point for feature code. It offers two
//! deliberately different contracts:
//!
//! - [`execute_with_handling`](OperationExecutor::execute_with_handling) never
//!   fails. A failure is classified, recorded in the history and the current
//!   error slot, and `None` is returned.
//! - [`execute_with_retry`](OperationExecutor::execute_with_retry) is
//!   transparent. It retries retryable failures and returns the last error
//!   unchanged, without recording anything.
//!
//! Composing the two records a failure exactly once:
//!
//! ```rust,no_run
//! use resilient_ops::{HandlingOptions, OperationExecutor, RawError, RetryOptions};
//!
//! # async fn fetch_feed() -> Result<Vec<String>, RawError> { Ok(vec![]) }
//! # async fn example() {
//! let executor = OperationExecutor::global();
//! let feed = executor
//!     .execute_with_handling(
//!         "feed.load",
//!         || executor.execute_with_retry(fetch_feed, RetryOptions::new().operation("feed.load")),
//!         HandlingOptions::new().error_context("Loading feed"),
//!     )
//!     .await;
//! # }
//! ```

use std::fmt;
use std::future::Future;

use once_cell::sync::Lazy;
use tokio::sync::broadcast;

use crate::classifier::ErrorClassifier;
use crate::config::ResilienceConfig;
use crate::error::{AppError, Failure};
use crate::events::{EventBus, ResilienceEvent};
use crate::logging::log_debug;
use crate::retry::{RetryExecutor, RetryOptions};
use crate::state::loading::LoadingGuard;
use crate::state::{
    CurrentErrorSlot, ErrorHistoryBuffer, LoadingStateRegistry, NotificationQueue, OperationKey,
    SuccessNotification,
};

type SuccessCallback<T> = Box<dyn FnOnce(&T) + Send>;
type ErrorCallback = Box<dyn FnOnce(&AppError) + Send>;

/// Options for [`OperationExecutor::execute_with_handling`].
pub struct HandlingOptions<T> {
    /// Notification shown when the operation succeeds
    pub success_message: Option<String>,
    /// Action label attached to the success notification
    pub success_action: Option<String>,
    /// Context recorded with a failure; defaults to the operation key
    pub error_context: Option<String>,
    on_success: Option<SuccessCallback<T>>,
    on_error: Option<ErrorCallback>,
}

impl<T> Default for HandlingOptions<T> {
    fn default() -> Self {
        Self {
            success_message: None,
            success_action: None,
            error_context: None,
            on_success: None,
            on_error: None,
        }
    }
}

impl<T> fmt::Debug for HandlingOptions<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlingOptions")
            .field("success_message", &self.success_message)
            .field("success_action", &self.success_action)
            .field("error_context", &self.error_context)
            .field("on_success", &self.on_success.is_some())
            .field("on_error", &self.on_error.is_some())
            .finish()
    }
}

impl<T> HandlingOptions<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn success_message(mut self, message: impl Into<String>) -> Self {
        self.success_message = Some(message.into());
        self
    }

    pub fn success_action(mut self, action: impl Into<String>) -> Self {
        self.success_action = Some(action.into());
        self
    }

    pub fn error_context(mut self, context: impl Into<String>) -> Self {
        self.error_context = Some(context.into());
        self
    }

    pub fn on_success(mut self, callback: impl FnOnce(&T) + Send + 'static) -> Self {
        self.on_success = Some(Box::new(callback));
        self
    }

    pub fn on_error(mut self, callback: impl FnOnce(&AppError) + Send + 'static) -> Self {
        self.on_error = Some(Box::new(callback));
        self
    }
}

static GLOBAL: Lazy<OperationExecutor> = Lazy::new(OperationExecutor::with_defaults);

/// Runs operations, tracking their loading state and handling their failures.
///
/// Cloning is cheap and clones share all state.
#[derive(Debug, Clone)]
pub struct OperationExecutor {
    config: ResilienceConfig,
    classifier: ErrorClassifier,
    events: EventBus,
    loading: LoadingStateRegistry,
    notifications: NotificationQueue,
    history: ErrorHistoryBuffer,
    current_error: CurrentErrorSlot,
}

impl Default for OperationExecutor {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl OperationExecutor {
    /// Create an executor with its own state.
    ///
    /// The config is used as given; call
    /// [`ResilienceConfig::validate`] first if it comes from outside.
    pub fn new(config: ResilienceConfig) -> Self {
        let events = EventBus::new(config.event_buffer);
        Self {
            classifier: ErrorClassifier::new(),
            loading: LoadingStateRegistry::new(events.clone()),
            notifications: NotificationQueue::new(config.notification_ttl, events.clone()),
            history: ErrorHistoryBuffer::new(config.history_capacity),
            current_error: CurrentErrorSlot::new(events.clone()),
            events,
            config,
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(ResilienceConfig::default())
    }

    /// Process-wide executor, created with default settings on first use.
    pub fn global() -> &'static OperationExecutor {
        &GLOBAL
    }

    pub fn config(&self) -> &ResilienceConfig {
        &self.config
    }

    pub fn classifier(&self) -> &ErrorClassifier {
        &self.classifier
    }

    /// Run `work`, converting any failure into a recorded [`AppError`].
    ///
    /// Marks `key` as loading for the duration of the call and clears the
    /// current error before starting. On success, shows the configured
    /// success notification and calls `on_success`. On failure, classifies
    /// the error (context: `error_context`, falling back to `key`), records
    /// it in the history and the current error slot, calls `on_error` and
    /// returns `None`. No failure escapes this call.
    pub async fn execute_with_handling<F, Fut, T, E>(
        &self,
        key: impl Into<OperationKey>,
        work: F,
        options: HandlingOptions<T>,
    ) -> Option<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Failure,
    {
        let key = key.into();
        let _loading = LoadingGuard::start(&self.loading, &key);
        self.current_error.clear();

        match work().await {
            Ok(value) => {
                log_debug!(operation = %key, "Operation completed");
                if let Some(message) = options.success_message {
                    self.notifications.show(message, options.success_action);
                }
                if let Some(on_success) = options.on_success {
                    on_success(&value);
                }
                Some(value)
            }
            Err(error) => {
                let context = options.error_context.as_deref().unwrap_or(key.as_str());
                let classified = self.classifier.classify(&error, Some(context));

                self.history.record(classified.clone());
                self.current_error.set(classified.clone());
                if let Some(on_error) = options.on_error {
                    on_error(&classified);
                }
                None
            }
        }
    }

    /// Run `work` with bounded retry, returning its result or its last error.
    ///
    /// Attempts run strictly one after another. A failure classified as not
    /// retryable is returned at once; a retryable one is retried after the
    /// backoff delay until the attempts are exhausted. When
    /// `options.operation` is set, that key is marked loading with progress
    /// `attempt / max_retries * 100` and cleared again on every exit path.
    ///
    /// Classification here only decides retryability; the history and the
    /// current error slot are left untouched.
    pub async fn execute_with_retry<F, Fut, T, E>(&self, work: F, options: RetryOptions) -> Result<T, E>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Failure,
    {
        RetryExecutor::new(options, self.classifier, &self.loading)
            .execute(work)
            .await
    }

    /// Retry using this executor's configured default policy.
    pub async fn execute_with_default_retry<F, Fut, T, E>(
        &self,
        work: F,
        operation: Option<OperationKey>,
    ) -> Result<T, E>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Failure,
    {
        let options = RetryOptions {
            policy: self.config.retry.clone(),
            operation,
            error_context: None,
        };
        self.execute_with_retry(work, options).await
    }

    // =========================================================================
    // Read access and acknowledgement for the presentation layer
    // =========================================================================

    pub fn current_error(&self) -> Option<AppError> {
        self.current_error.get()
    }

    pub fn dismiss_error(&self) {
        self.current_error.clear();
    }

    /// Recent errors, oldest first.
    pub fn error_history(&self) -> Vec<AppError> {
        self.history.snapshot()
    }

    pub fn clear_history(&self) {
        self.history.clear();
    }

    pub fn is_loading(&self, key: impl Into<OperationKey>) -> bool {
        self.loading.is_loading(&key.into())
    }

    pub fn progress(&self, key: impl Into<OperationKey>) -> Option<f64> {
        self.loading.progress(&key.into())
    }

    /// Set or clear a key's loading state directly.
    pub fn set_loading(&self, key: impl Into<OperationKey>, is_loading: bool, progress: Option<f64>) {
        self.loading.set_loading(&key.into(), is_loading, progress);
    }

    pub fn loading(&self) -> &LoadingStateRegistry {
        &self.loading
    }

    /// Show a success notification outside of an executed operation.
    pub fn show_success(&self, message: impl Into<String>, action: Option<String>) -> SuccessNotification {
        self.notifications.show(message, action)
    }

    pub fn notifications(&self) -> Vec<SuccessNotification> {
        self.notifications.list()
    }

    pub fn dismiss_notification(&self, notification: &SuccessNotification) -> bool {
        self.notifications.dismiss(notification)
    }

    /// Receive every subsequent state change.
    pub fn subscribe(&self) -> broadcast::Receiver<ResilienceEvent> {
        self.events.subscribe()
    }
}
