//! Allocation error types.

use rust_decimal::Decimal;
use thiserror::Error;

use crate::outstanding::OutstandingError;

/// Errors that can occur while allocating a payment.
#[derive(Debug, Error)]
pub enum AllocationError {
    /// Payment must be positive with at most 2 decimal places.
    #[error("Invalid payment amount: {0}")]
    InvalidPaymentAmount(Decimal),

    /// Party key is blank.
    #[error("Party key must not be blank")]
    BlankParty,

    /// Underlying item rejected the change.
    #[error(transparent)]
    Outstanding(#[from] OutstandingError),
}

impl AllocationError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidPaymentAmount(_) => "INVALID_PAYMENT_AMOUNT",
            Self::BlankParty => "BLANK_PARTY",
            Self::Outstanding(e) => e.error_code(),
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::InvalidPaymentAmount(_) | Self::BlankParty => 400,
            Self::Outstanding(e) => e.http_status_code(),
        }
    }

    /// Returns true if the caller may retry the operation unchanged.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Outstanding(e) if e.is_retryable())
    }
}

impl From<AllocationError> for bahi_shared::AppError {
    fn from(err: AllocationError) -> Self {
        Self::from_status(err.http_status_code(), err.to_string())
    }
}
