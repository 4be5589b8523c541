// Unit Tests for Failure Classification
//
// UNIT UNDER TEST: ErrorClassifier
//
// BUSINESS RESPONSIBILITY:
//   - Maps backend error codes to structured categories with retry guidance
//   - Falls back to message inspection for failures without a code
//   - Never fails, whatever the input looks like
//   - Produces user-safe messages and recovery suggestions
//
// TEST COVERAGE:
//   - Every entry of the code table
//   - Message rules and their precedence
//   - Degenerate inputs (empty failure, empty code, anyhow/io errors)
//   - Context and details recording

use crate::classifier::{codes, ErrorClassifier};
use crate::error::{AppError, ErrorCategory, ErrorSeverity, RawError};

#[cfg(test)]
mod code_table_tests {
    use super::*;

    fn classify_code(code: &str) -> AppError {
        ErrorClassifier::new().classify(&RawError::with_code(code, "backend said no"), None)
    }

    #[test]
    fn test_row_not_found_is_a_non_retryable_warning() {
        // Arrange & Act
        let error = classify_code(codes::ROW_NOT_FOUND);

        // Assert
        assert_eq!(error.category(), ErrorCategory::NotFound);
        assert_eq!(error.severity(), ErrorSeverity::Warning);
        assert!(!error.retryable());
        assert_eq!(error.recovery_actions(), ["Go back", "Refresh the page"]);
    }

    #[test]
    fn test_unique_violation_is_a_conflict_without_recovery() {
        // Test verifies duplicate actions (liking twice, following twice) are
        // reported as already performed rather than as failures to retry

        // Arrange
        let raw = RawError {
            code: Some("23505".to_string()),
            ..RawError::default()
        };

        // Act
        let error = ErrorClassifier::new().classify(&raw, None);

        // Assert
        assert_eq!(error.category(), ErrorCategory::Conflict);
        assert_eq!(error.severity(), ErrorSeverity::Warning);
        assert!(!error.retryable());
        assert!(error.recovery_actions().is_empty());
        assert_eq!(error.code(), Some("23505"));
    }

    #[test]
    fn test_foreign_key_violation_is_a_validation_error() {
        let error = classify_code(codes::FOREIGN_KEY_VIOLATION);

        assert_eq!(error.category(), ErrorCategory::Validation);
        assert_eq!(error.severity(), ErrorSeverity::Error);
        assert!(!error.retryable());
        assert_eq!(error.recovery_actions(), ["Refresh the page", "Try again"]);
    }

    #[test]
    fn test_privilege_codes_are_authorization_errors() {
        for code in [codes::INSUFFICIENT_PRIVILEGE, codes::UNAUTHORIZED] {
            let error = classify_code(code);

            assert_eq!(error.category(), ErrorCategory::Authorization, "code {code}");
            assert_eq!(error.severity(), ErrorSeverity::Error);
            assert!(!error.retryable());
            assert_eq!(
                error.recovery_actions(),
                ["Check your permissions", "Contact the content owner"]
            );
        }
    }

    #[test]
    fn test_check_violation_is_a_validation_warning() {
        let error = classify_code(codes::CHECK_VIOLATION);

        assert_eq!(error.category(), ErrorCategory::Validation);
        assert_eq!(error.severity(), ErrorSeverity::Warning);
        assert!(!error.retryable());
    }

    #[test]
    fn test_unrecognized_codes_are_retryable_database_errors() {
        // Test verifies any code outside the table is treated as a transient
        // database failure

        for code in ["08006", "57014", "PGRST000", "XX000"] {
            // Act
            let error = classify_code(code);

            // Assert
            assert_eq!(error.category(), ErrorCategory::Database, "code {code}");
            assert_eq!(error.severity(), ErrorSeverity::Error);
            assert!(error.retryable(), "unknown code {code} should be retryable");
            assert_eq!(error.recovery_actions(), ["Try again", "Refresh the page"]);
        }
    }

    #[test]
    fn test_code_takes_precedence_over_message() {
        // A message mentioning the network must not override the code table
        let raw = RawError::with_code(codes::UNIQUE_VIOLATION, "network hiccup during insert");

        let error = ErrorClassifier::new().classify(&raw, None);

        assert_eq!(error.category(), ErrorCategory::Conflict);
    }

    #[test]
    fn test_code_from_backend_body() {
        // Arrange
        let body = serde_json::json!({
            "code": "PGRST116",
            "message": "JSON object requested, multiple (or no) rows returned",
            "details": "The result contains 0 rows",
            "hint": null
        });

        // Act
        let raw = RawError::from_backend_body(&body);
        let error = ErrorClassifier::new().classify(&raw, None);

        // Assert
        assert_eq!(raw.details.as_deref(), Some("The result contains 0 rows"));
        assert_eq!(raw.hint, None);
        assert_eq!(error.category(), ErrorCategory::NotFound);
        assert_eq!(
            error.message(),
            "JSON object requested, multiple (or no) rows returned"
        );
    }
}

#[cfg(test)]
mod message_rule_tests {
    use super::*;

    fn classify_message(message: &str) -> AppError {
        ErrorClassifier::new().classify(&RawError::new(message), None)
    }

    #[test]
    fn test_storage_and_upload_messages_are_retryable_storage_errors() {
        for message in ["storage bucket unavailable", "upload interrupted"] {
            let error = classify_message(message);

            assert_eq!(error.category(), ErrorCategory::Storage, "{message}");
            assert_eq!(error.severity(), ErrorSeverity::Error);
            assert!(error.retryable());
            assert_eq!(error.recovery_actions().len(), 3);
        }
    }

    #[test]
    fn test_network_messages_are_retryable_warnings() {
        for message in ["network request failed", "Failed to fetch", "lost network"] {
            let error = classify_message(message);

            assert_eq!(error.category(), ErrorCategory::Network, "{message}");
            assert_eq!(error.severity(), ErrorSeverity::Warning);
            assert!(error.retryable());
        }
    }

    #[test]
    fn test_invalid_file_type_keeps_message_for_users() {
        // Arrange
        let message = "Invalid file type. Allowed: JPEG, PNG";

        // Act
        let error = classify_message(message);

        // Assert
        assert_eq!(error.category(), ErrorCategory::Validation);
        assert_eq!(error.severity(), ErrorSeverity::Warning);
        assert!(!error.retryable());
        assert_eq!(error.user_message(), message);
    }

    #[test]
    fn test_storage_rule_wins_over_network_and_validation() {
        let error = classify_message("Invalid upload: network reset");

        assert_eq!(error.category(), ErrorCategory::Storage);
    }

    #[test]
    fn test_network_rule_wins_over_validation() {
        let error = classify_message("Invalid response from fetch");

        assert_eq!(error.category(), ErrorCategory::Network);
    }

    #[test]
    fn test_message_matching_is_case_sensitive() {
        // "Network" and "invalid" do not match the lowercase/capitalized needles
        let error = classify_message("Network down, invalid state");

        assert_eq!(error.category(), ErrorCategory::Unknown);
    }

    #[test]
    fn test_unrecognized_message_is_unknown_and_retryable() {
        let error = classify_message("something odd happened");

        assert_eq!(error.category(), ErrorCategory::Unknown);
        assert_eq!(error.severity(), ErrorSeverity::Error);
        assert!(error.retryable());
        assert_eq!(error.message(), "something odd happened");
        assert_eq!(error.recovery_actions(), ["Try again", "Contact support"]);
    }
}

#[cfg(test)]
mod degenerate_input_tests {
    use super::*;

    #[test]
    fn test_empty_failure_is_classified_as_unknown() {
        // Test verifies a failure carrying no information still produces a result

        // Act
        let error = ErrorClassifier::new().classify(&RawError::default(), None);

        // Assert
        assert_eq!(error.category(), ErrorCategory::Unknown);
        assert!(error.retryable());
        assert_eq!(error.code(), None);
        assert!(!error.user_message().is_empty());
    }

    #[test]
    fn test_empty_code_is_treated_as_absent() {
        let raw = RawError::with_code("", "fetch failed");

        let error = ErrorClassifier::new().classify(&raw, None);

        assert_eq!(error.category(), ErrorCategory::Network);
        assert_eq!(error.code(), None);
    }

    #[test]
    fn test_anyhow_error_exposes_wrapped_code() {
        // Arrange
        let wrapped = anyhow::Error::from(RawError::with_code("42501", "permission denied"));
        let plain = anyhow::anyhow!("network unreachable");

        // Act
        let wrapped_error = ErrorClassifier::new().classify(&wrapped, None);
        let plain_error = ErrorClassifier::new().classify(&plain, None);

        // Assert
        assert_eq!(wrapped_error.category(), ErrorCategory::Authorization);
        assert_eq!(plain_error.category(), ErrorCategory::Network);
    }

    #[test]
    fn test_boxed_errors_are_classified() {
        // Arrange
        let wrapped: Box<dyn std::error::Error + Send + Sync> =
            Box::new(RawError::with_code("23505", "duplicate key value"));
        let plain: Box<dyn std::error::Error + Send + Sync> = "upload interrupted".into();

        // Act
        let wrapped_error = ErrorClassifier::new().classify(&wrapped, None);
        let plain_error = ErrorClassifier::new().classify(&plain, None);

        // Assert
        assert_eq!(wrapped_error.category(), ErrorCategory::Conflict);
        assert_eq!(wrapped_error.code(), Some("23505"));
        assert_eq!(plain_error.category(), ErrorCategory::Storage);
        assert_eq!(plain_error.message(), "upload interrupted");
    }

    #[test]
    fn test_strings_and_io_errors_are_classified_by_message() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "upload stalled");

        let from_io = ErrorClassifier::new().classify(&io, None);
        let from_str = ErrorClassifier::new().classify(&"validation failed", None);
        let from_string = ErrorClassifier::new().classify(&"timeout".to_string(), None);

        assert_eq!(from_io.category(), ErrorCategory::Storage);
        assert_eq!(from_str.category(), ErrorCategory::Validation);
        assert_eq!(from_string.category(), ErrorCategory::Unknown);
    }

    #[test]
    fn test_reclassifying_an_app_error_is_stable() {
        let first = ErrorClassifier::new().classify(&RawError::with_code("23505", "dup"), None);

        let second = ErrorClassifier::new().classify(&first, None);

        assert_eq!(second.category(), first.category());
        assert_eq!(second.retryable(), first.retryable());
    }

    #[test]
    fn test_context_is_recorded_in_details() {
        // Act
        let error =
            ErrorClassifier::new().classify(&RawError::new("boom"), Some("Creating story"));

        // Assert
        let details = error.details().expect("details should be recorded");
        assert_eq!(details["context"], "Creating story");
        assert!(details["source"].as_str().unwrap_or_default().contains("boom"));
    }

    #[test]
    fn test_app_error_serializes_with_snake_case_names() {
        let error = ErrorClassifier::new().classify(&RawError::with_code("PGRST116", "none"), None);

        let json = serde_json::to_value(&error).expect("AppError should serialize");

        assert_eq!(json["category"], "not_found");
        assert_eq!(json["severity"], "warning");
        assert_eq!(json["retryable"], false);
    }
}
