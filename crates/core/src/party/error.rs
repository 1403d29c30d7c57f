//! Party ledger error types.

use rust_decimal::Decimal;
use thiserror::Error;

use bahi_shared::types::PartyLedgerId;

use super::types::PartyLedgerStatus;

/// Errors that can occur on party ledgers.
#[derive(Debug, Error)]
pub enum PartyLedgerError {
    /// Ledger not found.
    #[error("Party ledger not found: {0}")]
    NotFound(PartyLedgerId),

    /// Amount must be positive with at most 2 decimal places.
    #[error("Invalid amount: {0}")]
    InvalidAmount(Decimal),

    /// Suspended ledgers accept no entries.
    #[error("Party ledger {0} is suspended")]
    Suspended(PartyLedgerId),

    /// Status change not permitted.
    #[error("Invalid status transition from {from} to {to}")]
    InvalidStatusTransition {
        /// Current status.
        from: PartyLedgerStatus,
        /// Requested status.
        to: PartyLedgerStatus,
    },

    /// Required field is blank.
    #[error("Field must not be blank: {0}")]
    BlankField(&'static str),

    /// Phone number has no digits.
    #[error("Invalid phone number: {0}")]
    InvalidPhone(String),
}

impl PartyLedgerError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "PARTY_LEDGER_NOT_FOUND",
            Self::InvalidAmount(_) => "INVALID_AMOUNT",
            Self::Suspended(_) => "PARTY_LEDGER_SUSPENDED",
            Self::InvalidStatusTransition { .. } => "INVALID_STATUS_TRANSITION",
            Self::BlankField(_) => "BLANK_FIELD",
            Self::InvalidPhone(_) => "INVALID_PHONE",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::NotFound(_) => 404,
            Self::Suspended(_) | Self::InvalidStatusTransition { .. } => 422,
            Self::InvalidAmount(_) | Self::BlankField(_) | Self::InvalidPhone(_) => 400,
        }
    }
}

impl From<PartyLedgerError> for bahi_shared::AppError {
    fn from(err: PartyLedgerError) -> Self {
        Self::from_status(err.http_status_code(), err.to_string())
    }
}
