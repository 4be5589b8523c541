//! # resilient-ops
//!
//! Operation execution for a social-network client: every call against the
//! hosted data platform goes through one layer that classifies failures,
//! retries the transient ones, tracks loading state and shows success
//! notifications.
//!
//! ## Key Features
//!
//! - **Classification**: Raw failures become structured [`AppError`]s with a
//!   category, severity, retry guidance and user-safe text
//! - **Retry**: Bounded retry with exponential backoff, driven by classification
//! - **Loading state**: Per-operation loading flags and progress
//! - **Notifications**: Success messages that expire on their own
//! - **History**: Bounded log of recent errors for diagnostics
//! - **Events**: State changes published to any number of subscribers
//!
//! ## Example
//!
//! ```rust,no_run
//! use resilient_ops::{HandlingOptions, OperationExecutor, RawError};
//!
//! # async fn like_post() -> Result<(), RawError> { Ok(()) }
//! # async fn example() {
//! let executor = OperationExecutor::global();
//!
//! let liked = executor
//!     .execute_with_handling(
//!         "post.like",
//!         like_post,
//!         HandlingOptions::new().success_message("Post liked"),
//!     )
//!     .await;
//!
//! if liked.is_none() {
//!     if let Some(err) = executor.current_error() {
//!         println!("{}", err.user_message());
//!     }
//! }
//! # }
//! ```

// Allow missing errors documentation - errors are self-documenting via type signatures
#![allow(clippy::missing_errors_doc)]

// Logging utilities (re-exports tracing with log_* naming) - internal only
pub(crate) mod logging;

pub mod classifier;
pub mod config;
pub mod error;
pub mod events;
pub mod executor;
pub mod facade;
pub mod retry;
pub mod state;

#[cfg(test)]
pub mod tests;

// Re-export main types
pub use classifier::ErrorClassifier;
pub use config::ResilienceConfig;
pub use error::{
    AppError, ConfigError, ErrorCategory, ErrorSeverity, Failure, RawError, ResilienceResult,
};
pub use events::{EventBus, ResilienceEvent};
pub use executor::{HandlingOptions, OperationExecutor};
pub use retry::{RetryOptions, RetryPolicy};
pub use state::{
    CurrentErrorSlot, ErrorHistoryBuffer, LoadingState, LoadingStateRegistry, NotificationQueue,
    OperationKey, SuccessNotification,
};
