//! Tax error types.

use rust_decimal::Decimal;
use thiserror::Error;

/// Errors that can occur during tax computation.
#[derive(Debug, Error)]
pub enum TaxError {
    /// Line total is negative.
    #[error("Line total must not be negative: {0}")]
    NegativeLineTotal(Decimal),

    /// Rate outside 0..=100.
    #[error("Tax rate must be between 0 and 100: {0}")]
    InvalidRate(Decimal),

    /// Business state is not configured.
    #[error("Business state is not configured")]
    MissingBusinessState,
}

impl TaxError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NegativeLineTotal(_) => "NEGATIVE_LINE_TOTAL",
            Self::InvalidRate(_) => "INVALID_TAX_RATE",
            Self::MissingBusinessState => "MISSING_BUSINESS_STATE",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::NegativeLineTotal(_) | Self::InvalidRate(_) => 400,
            Self::MissingBusinessState => 500,
        }
    }
}

impl From<TaxError> for bahi_shared::AppError {
    fn from(err: TaxError) -> Self {
        Self::from_status(err.http_status_code(), err.to_string())
    }
}
