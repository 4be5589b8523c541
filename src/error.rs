//! Error types for resilient operations.
//!
//! This module holds both sides of failure classification:
//!
//! - [`Failure`] and [`RawError`]: what a unit of work hands back when it fails
//!   (a backend error body, an I/O error, an `anyhow::Error`, a plain string).
//! - [`AppError`]: the immutable, structured result of classifying a failure,
//!   with a category, severity, retry guidance and user-safe text.
//!
//! [`ConfigError`] covers invalid [`ResilienceConfig`](crate::config::ResilienceConfig)
//! values.
//!
//! # Example
//!
//! ```rust
//! use resilient_ops::{ErrorClassifier, RawError, error::ErrorCategory};
//!
//! let classifier = ErrorClassifier::new();
//! let err = classifier.classify(&RawError::with_code("23505", "duplicate key"), None);
//!
//! assert_eq!(err.category(), ErrorCategory::Conflict);
//! assert!(!err.retryable());
//! ```

use std::borrow::Cow;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::logging::log_error;

// ============================================================================
// Error categorization types
// ============================================================================

/// What kind of failure an [`AppError`] describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Input was rejected (bad reference, constraint check, explicit validation).
    Validation,
    /// The caller is not allowed to do this.
    Authorization,
    /// The requested row or resource does not exist.
    NotFound,
    /// The action was already performed (unique constraint).
    Conflict,
    /// File storage or upload failure.
    Storage,
    /// Connectivity failure.
    Network,
    /// Any other backend failure that carried an error code.
    Database,
    /// Nothing recognizable.
    Unknown,
}

impl ErrorCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::Authorization => "authorization",
            Self::NotFound => "not_found",
            Self::Conflict => "conflict",
            Self::Storage => "storage",
            Self::Network => "network",
            Self::Database => "database",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Severity level for logging and display decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorSeverity {
    /// Expected failure, informational only.
    Info,
    /// Unexpected but recoverable.
    Warning,
    /// Action failed but the client is stable.
    Error,
    /// Client state may be compromised.
    Critical,
}

impl ErrorSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
            Self::Critical => "critical",
        }
    }
}

impl fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Classified error
// ============================================================================

/// Structured, immutable result of classifying a failure.
///
/// Only [`user_message()`](Self::user_message) and
/// [`recovery_actions()`](Self::recovery_actions) are meant for display;
/// `message`, `code` and `details` are diagnostic.
///
/// Fields are read through accessors: nothing about a classification,
/// `retryable` included, changes after it is made.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[error("{category} error: {message}")]
pub struct AppError {
    category: ErrorCategory,
    severity: ErrorSeverity,
    message: String,
    user_message: String,
    code: Option<String>,
    details: Option<serde_json::Value>,
    timestamp: DateTime<Utc>,
    retryable: bool,
    recovery_actions: Vec<String>,
}

impl AppError {
    pub(crate) fn new(
        category: ErrorCategory,
        severity: ErrorSeverity,
        message: impl Into<String>,
        user_message: impl Into<String>,
        retryable: bool,
    ) -> Self {
        Self {
            category,
            severity,
            message: message.into(),
            user_message: user_message.into(),
            code: None,
            details: None,
            timestamp: Utc::now(),
            retryable,
            recovery_actions: Vec::new(),
        }
    }

    pub(crate) fn with_code(mut self, code: Option<String>) -> Self {
        self.code = code;
        self
    }

    pub(crate) fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    pub(crate) fn with_recovery(mut self, actions: &[&str]) -> Self {
        self.recovery_actions = actions.iter().map(|a| (*a).to_string()).collect();
        self
    }

    pub fn category(&self) -> ErrorCategory {
        self.category
    }

    pub fn severity(&self) -> ErrorSeverity {
        self.severity
    }

    /// Raw diagnostic text. Not for end users.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Text that is safe to show to end users.
    pub fn user_message(&self) -> &str {
        &self.user_message
    }

    /// Upstream error code, when the failure carried one.
    pub fn code(&self) -> Option<&str> {
        self.code.as_deref()
    }

    /// Caller context and originating failure, as recorded at classification time.
    pub fn details(&self) -> Option<&serde_json::Value> {
        self.details.as_ref()
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Whether an automatic retry is appropriate.
    pub fn retryable(&self) -> bool {
        self.retryable
    }

    /// Short suggested user actions, most relevant first. May be empty.
    pub fn recovery_actions(&self) -> &[String] {
        &self.recovery_actions
    }
}

// ============================================================================
// Raw failures
// ============================================================================

/// Anything a unit of work can fail with, as seen by the classifier.
///
/// Classification only looks at an upstream error code and the failure's
/// message text. Implemented for the common error types; implement it for
/// your own error types to give them a code.
pub trait Failure: fmt::Debug + Send + Sync {
    /// Upstream error code (e.g. a backend error identifier), if any.
    fn code(&self) -> Option<&str> {
        None
    }

    /// Free-text description of the failure.
    fn message(&self) -> Cow<'_, str>;
}

/// Failure reported by the hosted data platform or constructed by a caller.
///
/// Every field is optional; `RawError::default()` stands for a failure that
/// carried no information at all.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawError {
    pub code: Option<String>,
    pub message: Option<String>,
    pub details: Option<String>,
    pub hint: Option<String>,
}

impl RawError {
    /// A failure with a message and no code.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..Self::default()
        }
    }

    /// A failure with an upstream code and message.
    pub fn with_code(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: Some(code.into()),
            message: Some(message.into()),
            ..Self::default()
        }
    }

    /// Read a backend error body of the form
    /// `{"code": .., "message": .., "details": .., "hint": ..}`.
    ///
    /// Missing or non-string fields are left empty; this never fails.
    pub fn from_backend_body(body: &serde_json::Value) -> Self {
        let field = |name: &str| {
            body.get(name)
                .and_then(serde_json::Value::as_str)
                .map(str::to_string)
        };
        Self {
            code: field("code"),
            message: field("message"),
            details: field("details"),
            hint: field("hint"),
        }
    }
}

impl fmt::Display for RawError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.code, &self.message) {
            (Some(code), Some(message)) => write!(f, "[{code}] {message}"),
            (Some(code), None) => write!(f, "[{code}]"),
            (None, Some(message)) => f.write_str(message),
            (None, None) => f.write_str("unknown failure"),
        }
    }
}

impl std::error::Error for RawError {}

impl Failure for RawError {
    fn code(&self) -> Option<&str> {
        self.code.as_deref().filter(|c| !c.is_empty())
    }

    fn message(&self) -> Cow<'_, str> {
        Cow::Borrowed(self.message.as_deref().unwrap_or_default())
    }
}

impl Failure for AppError {
    fn code(&self) -> Option<&str> {
        self.code.as_deref().filter(|c| !c.is_empty())
    }

    fn message(&self) -> Cow<'_, str> {
        Cow::Borrowed(&self.message)
    }
}

impl Failure for anyhow::Error {
    fn code(&self) -> Option<&str> {
        self.downcast_ref::<RawError>().and_then(Failure::code)
    }

    fn message(&self) -> Cow<'_, str> {
        match self.downcast_ref::<RawError>() {
            Some(raw) => Failure::message(raw),
            None => Cow::Owned(self.to_string()),
        }
    }
}

impl Failure for Box<dyn std::error::Error + Send + Sync> {
    fn code(&self) -> Option<&str> {
        self.downcast_ref::<RawError>().and_then(Failure::code)
    }

    fn message(&self) -> Cow<'_, str> {
        match self.downcast_ref::<RawError>() {
            Some(raw) => Failure::message(raw),
            None => Cow::Owned(self.to_string()),
        }
    }
}

impl Failure for std::io::Error {
    fn message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }
}

impl Failure for String {
    fn message(&self) -> Cow<'_, str> {
        Cow::Borrowed(self)
    }
}

impl Failure for &'static str {
    fn message(&self) -> Cow<'_, str> {
        Cow::Borrowed(self)
    }
}

// ============================================================================
// Configuration errors
// ============================================================================

/// Convenient result type for configuration handling.
pub type ResilienceResult<T> = std::result::Result<T, ConfigError>;

/// Invalid [`ResilienceConfig`](crate::config::ResilienceConfig) values.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A numeric setting was outside its allowed range.
    #[error("Invalid configuration value for {field}: {message}")]
    InvalidValue {
        /// Name of the offending setting.
        field: &'static str,
        /// Why it was rejected.
        message: String,
    },

    /// The configuration document could not be parsed.
    #[error("Failed to parse configuration: {source}")]
    Parse {
        #[source]
        source: serde_json::Error,
    },
}

impl ConfigError {
    /// Create an invalid value error (logs at ERROR level).
    pub fn invalid_value(field: &'static str, message: impl Into<String>) -> Self {
        let message = message.into();
        log_error!(
            error_type = "invalid_config_value",
            field = field,
            message = %message,
            "Resilience configuration validation failed"
        );
        Self::InvalidValue { field, message }
    }

    /// Create a parse error (logs at ERROR level).
    pub fn parse(source: serde_json::Error) -> Self {
        log_error!(
            error_type = "config_parse",
            line = source.line(),
            column = source.column(),
            error = %source,
            "Resilience configuration could not be parsed"
        );
        Self::Parse { source }
    }
}
