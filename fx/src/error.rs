//! Conversion engine error types.

use crossrate_common::MoneyError;
use thiserror::Error;

/// Errors surfaced to conversion callers.
#[derive(Debug, Error)]
pub enum FxError {
    /// No direct rate, no pivot path, and no backend or default-table
    /// rate for the requested pair.
    #[error("no exchange rate available from {from} to {to}")]
    RateUnavailable { from: String, to: String },

    /// Invalid monetary value or mixed-currency arithmetic.
    #[error(transparent)]
    Money(#[from] MoneyError),

    /// Every backend failed and the failure could not be absorbed.
    #[error(transparent)]
    Backend(#[from] BackendError),
}

impl FxError {
    /// Build a `RateUnavailable` from two currency codes.
    pub fn unavailable(from: &str, to: &str) -> Self {
        Self::RateUnavailable {
            from: from.to_string(),
            to: to.to_string(),
        }
    }
}

/// A single backend attempt failing. Swallowed by the provider chain,
/// which moves on to the next backend; never surfaced to conversion
/// callers directly.
#[derive(Debug, Error)]
pub enum BackendError {
    /// The injected transport reported an error (non-2xx, I/O, ...).
    #[error("transport error: {0}")]
    Transport(String),

    /// The fetch did not complete within the configured timeout.
    #[error("backend timed out")]
    Timeout,

    /// Missing success flag, missing rates field, or unparseable rates.
    #[error("malformed or unexpected response body")]
    MalformedResponse,

    /// The backend requires an API key and none is configured.
    #[error("backend requires an API key")]
    MissingApiKey,
}

/// Result type for conversion operations.
pub type FxResult<T> = Result<T, FxError>;
