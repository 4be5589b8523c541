//! Logging utilities for resilient-ops
//!
//! Re-exports tracing macros with log_* naming convention for consistency,
//! plus the severity-driven dispatch used when a failure is classified.

use crate::error::{AppError, ErrorSeverity};

// Re-export tracing macros with log_* naming
pub use tracing::{
    debug as log_debug,
    error as log_error,
    info as log_info,
    trace as log_trace,
    warn as log_warn,
};

/// Write a classified error to the diagnostic log at a level derived from its severity.
///
/// Critical and error map to ERROR, warning to WARN, info to INFO.
pub(crate) fn log_classified(error: &AppError) {
    match error.severity() {
        ErrorSeverity::Critical | ErrorSeverity::Error => log_error!(
            category = %error.category(),
            severity = %error.severity(),
            code = ?error.code(),
            retryable = error.retryable(),
            message = %error.message(),
            "Operation failed"
        ),
        ErrorSeverity::Warning => log_warn!(
            category = %error.category(),
            code = ?error.code(),
            retryable = error.retryable(),
            message = %error.message(),
            "Operation failed"
        ),
        ErrorSeverity::Info => log_info!(
            category = %error.category(),
            code = ?error.code(),
            message = %error.message(),
            "Operation reported an expected failure"
        ),
    }
}
