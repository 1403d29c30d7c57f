//! Outstanding error types.

use rust_decimal::Decimal;
use thiserror::Error;

use bahi_shared::types::OutstandingId;

use super::types::OutstandingStatus;

/// Errors that can occur while tracking outstanding items.
#[derive(Debug, Error)]
pub enum OutstandingError {
    /// Outstanding item not found.
    #[error("Outstanding item not found: {0}")]
    NotFound(OutstandingId),

    /// Transition not permitted by the lifecycle.
    #[error("Invalid status transition from {from} to {to}")]
    InvalidStatusTransition {
        /// Current status.
        from: OutstandingStatus,
        /// Requested status.
        to: OutstandingStatus,
    },

    /// Explicit settlement larger than what remains.
    #[error("Cannot settle {requested}: only {remaining} remains outstanding")]
    InsufficientOutstanding {
        /// Amount requested.
        requested: Decimal,
        /// Amount remaining on the item.
        remaining: Decimal,
    },

    /// Amount must be positive with at most 2 decimal places.
    #[error("Invalid amount: {0}")]
    InvalidAmount(Decimal),

    /// Required field is blank.
    #[error("Field must not be blank: {0}")]
    BlankField(&'static str),

    /// Row changed between read and write.
    #[error("Outstanding item {0} was modified concurrently")]
    ConcurrentModification(OutstandingId),
}

impl OutstandingError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "OUTSTANDING_NOT_FOUND",
            Self::InvalidStatusTransition { .. } => "INVALID_STATUS_TRANSITION",
            Self::InsufficientOutstanding { .. } => "INSUFFICIENT_OUTSTANDING",
            Self::InvalidAmount(_) => "INVALID_AMOUNT",
            Self::BlankField(_) => "BLANK_FIELD",
            Self::ConcurrentModification(_) => "CONCURRENT_MODIFICATION",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::NotFound(_) => 404,
            Self::InvalidStatusTransition { .. } | Self::InsufficientOutstanding { .. } => 422,
            Self::ConcurrentModification(_) => 409,
            Self::InvalidAmount(_) | Self::BlankField(_) => 400,
        }
    }

    /// Returns true if the caller may retry the operation unchanged.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::ConcurrentModification(_))
    }
}

impl From<OutstandingError> for bahi_shared::AppError {
    fn from(err: OutstandingError) -> Self {
        Self::from_status(err.http_status_code(), err.to_string())
    }
}
