//! Error assertion helpers.

use sui_relayer_core::ErrorCode;

/// Assert that an error message contains `expected_text` (case-insensitive).
pub fn assert_error_contains<E: std::fmt::Display>(error: E, expected_text: &str, context: &str) {
    let error_str = error.to_string().to_lowercase();
    assert!(
        error_str.contains(&expected_text.to_lowercase()),
        "{}: error message should contain '{}', got: {}",
        context,
        expected_text,
        error
    );
}

/// Assert the machine-readable code of an error.
pub fn assert_code<E: ErrorCode + std::fmt::Debug>(error: &E, expected: &str) {
    assert_eq!(error.code(), expected, "unexpected error: {:?}", error);
}
