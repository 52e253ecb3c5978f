//! Error types for monetary value operations.

use thiserror::Error;

/// Errors raised by `Currency` and `Money` construction and arithmetic.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoneyError {
    /// Malformed currency code or name, or an unparseable amount literal.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Arithmetic or comparison between two different currencies.
    #[error("currency mismatch: expected {expected}, got {actual}")]
    CurrencyMismatch { expected: String, actual: String },

    /// Division of a monetary amount by zero.
    #[error("division by zero")]
    DivisionByZero,
}

impl MoneyError {
    /// Build a mismatch error from two currency codes.
    pub fn mismatch(expected: &str, actual: &str) -> Self {
        Self::CurrencyMismatch {
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }
}

/// Result type alias for monetary operations.
pub type MoneyResult<T> = Result<T, MoneyError>;
