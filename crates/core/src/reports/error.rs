//! Report error types.

use chrono::NaiveDate;
use thiserror::Error;

use bahi_shared::types::AccountId;

/// Errors that can occur during report generation.
///
/// Empty data is never an error; it yields zero rows.
#[derive(Debug, Error)]
pub enum ReportError {
    /// Account not found.
    #[error("Account not found: {0}")]
    AccountNotFound(AccountId),

    /// Invalid date range.
    #[error("Invalid date range: start {start} is after end {end}")]
    InvalidDateRange {
        /// Start date.
        start: NaiveDate,
        /// End date.
        end: NaiveDate,
    },
}

impl ReportError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::AccountNotFound(_) => "ACCOUNT_NOT_FOUND",
            Self::InvalidDateRange { .. } => "INVALID_DATE_RANGE",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::AccountNotFound(_) => 404,
            Self::InvalidDateRange { .. } => 400,
        }
    }
}

impl From<ReportError> for bahi_shared::AppError {
    fn from(err: ReportError) -> Self {
        Self::from_status(err.http_status_code(), err.to_string())
    }
}
