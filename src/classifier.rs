//! Failure classification.
//!
//! [`ErrorClassifier::classify`] maps any [`Failure`] to an [`AppError`]. It
//! is total: every input, including a failure with no code and no message,
//! produces a classification.
//!
//! Rules are applied in order and the first match wins:
//!
//! | Input | Category | Severity | Retryable |
//! |-------|----------|----------|-----------|
//! | code `PGRST116` | NotFound | Warning | No |
//! | code `23505` | Conflict | Warning | No |
//! | code `23503` | Validation | Error | No |
//! | code `42501` / `PGRST301` | Authorization | Error | No |
//! | code `23514` | Validation | Warning | No |
//! | any other code | Database | Error | Yes |
//! | message mentions `storage` / `upload` | Storage | Error | Yes |
//! | message mentions `network` / `fetch` | Network | Warning | Yes |
//! | message mentions `Invalid` / `validation` | Validation | Warning | No |
//! | anything else | Unknown | Error | Yes |
//!
//! Message matching is case-sensitive.

use serde_json::json;

use crate::error::{AppError, ErrorCategory, ErrorSeverity, Failure};
use crate::logging::log_classified;

/// Upstream error codes reported by the hosted data platform.
pub mod codes {
    /// No row matched a single-row query.
    pub const ROW_NOT_FOUND: &str = "PGRST116";
    /// Unique constraint violation.
    pub const UNIQUE_VIOLATION: &str = "23505";
    /// Foreign key constraint violation.
    pub const FOREIGN_KEY_VIOLATION: &str = "23503";
    /// Insufficient privilege (row-level security).
    pub const INSUFFICIENT_PRIVILEGE: &str = "42501";
    /// Missing or rejected authorization for the request.
    pub const UNAUTHORIZED: &str = "PGRST301";
    /// Check constraint violation.
    pub const CHECK_VIOLATION: &str = "23514";
}

const STORAGE_RECOVERY: [&str; 3] = [
    "Check your internet connection",
    "Make sure the file is under the size limit",
    "Try a different file format",
];

/// Stateless mapping from raw failures to [`AppError`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ErrorClassifier;

impl ErrorClassifier {
    pub fn new() -> Self {
        Self
    }

    /// Classify a failure, optionally tagging it with the caller's context.
    ///
    /// The result is also written to the diagnostic log at a level derived
    /// from its severity.
    pub fn classify(&self, raw: &dyn Failure, context: Option<&str>) -> AppError {
        let message = raw.message();
        let code = raw.code().filter(|c| !c.is_empty());

        let error = match code {
            Some(code) => Self::classify_code(code, &message),
            None => Self::classify_message(&message),
        };

        let error = error.with_code(code.map(str::to_string)).with_details(json!({
            "context": context,
            "source": format!("{raw:?}"),
        }));

        log_classified(&error);
        error
    }

    fn classify_code(code: &str, message: &str) -> AppError {
        let message = if message.is_empty() {
            format!("Database error {code}")
        } else {
            message.to_string()
        };

        match code {
            codes::ROW_NOT_FOUND => AppError::new(
                ErrorCategory::NotFound,
                ErrorSeverity::Warning,
                message,
                "The requested item could not be found.",
                false,
            )
            .with_recovery(&["Go back", "Refresh the page"]),
            codes::UNIQUE_VIOLATION => AppError::new(
                ErrorCategory::Conflict,
                ErrorSeverity::Warning,
                message,
                "This action has already been performed.",
                false,
            ),
            codes::FOREIGN_KEY_VIOLATION => AppError::new(
                ErrorCategory::Validation,
                ErrorSeverity::Error,
                message,
                "This item references something that no longer exists.",
                false,
            )
            .with_recovery(&["Refresh the page", "Try again"]),
            codes::INSUFFICIENT_PRIVILEGE | codes::UNAUTHORIZED => AppError::new(
                ErrorCategory::Authorization,
                ErrorSeverity::Error,
                message,
                "You don't have permission to perform this action.",
                false,
            )
            .with_recovery(&["Check your permissions", "Contact the content owner"]),
            codes::CHECK_VIOLATION => AppError::new(
                ErrorCategory::Validation,
                ErrorSeverity::Warning,
                message,
                "The provided data is not valid.",
                false,
            )
            .with_recovery(&["Review your input"]),
            _ => AppError::new(
                ErrorCategory::Database,
                ErrorSeverity::Error,
                message,
                "A database error occurred. Please try again.",
                true,
            )
            .with_recovery(&["Try again", "Refresh the page"]),
        }
    }

    fn classify_message(message: &str) -> AppError {
        if mentions(message, &["storage", "upload"]) {
            AppError::new(
                ErrorCategory::Storage,
                ErrorSeverity::Error,
                message,
                "File upload failed. Please check your connection and file size.",
                true,
            )
            .with_recovery(&STORAGE_RECOVERY)
        } else if mentions(message, &["network", "fetch"]) {
            AppError::new(
                ErrorCategory::Network,
                ErrorSeverity::Warning,
                message,
                "Network error. Please check your connection and try again.",
                true,
            )
            .with_recovery(&["Check your internet connection", "Try again"])
        } else if mentions(message, &["Invalid", "validation"]) {
            // Validation messages are written for users already.
            AppError::new(
                ErrorCategory::Validation,
                ErrorSeverity::Warning,
                message,
                message,
                false,
            )
            .with_recovery(&["Review your input"])
        } else {
            let message = if message.is_empty() {
                "Unknown error"
            } else {
                message
            };
            AppError::new(
                ErrorCategory::Unknown,
                ErrorSeverity::Error,
                message,
                "An unexpected error occurred. Please try again.",
                true,
            )
            .with_recovery(&["Try again", "Contact support"])
        }
    }
}

fn mentions(message: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| message.contains(needle))
}
