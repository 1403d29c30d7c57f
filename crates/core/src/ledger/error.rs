//! Ledger error types for chart and voucher operations.

use rust_decimal::Decimal;
use thiserror::Error;

use bahi_shared::types::AccountId;

use super::types::AccountType;

/// Errors that can occur during chart of accounts and voucher operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    // ========== Voucher Errors ==========
    /// Voucher debits and credits differ.
    #[error("Voucher is not balanced. Debit: {debit}, Credit: {credit}")]
    ImbalancedVoucher {
        /// Total debit amount.
        debit: Decimal,
        /// Total credit amount.
        credit: Decimal,
    },

    /// No postings remain once blank lines are dropped.
    #[error("Voucher has no postings")]
    EmptyVoucher,

    /// A line amount is negative.
    #[error("Voucher line amounts cannot be negative")]
    NegativeAmount,

    /// A line amount has more than two decimal places.
    #[error("Amount {0} has more than two decimal places")]
    InvalidPrecision(Decimal),

    /// Voucher not found.
    #[error("Voucher not found: {0}")]
    VoucherNotFound(uuid::Uuid),

    // ========== Account Errors ==========
    /// Account not found.
    #[error("Account not found: {0}")]
    AccountNotFound(AccountId),

    /// No account carries the given code.
    #[error("No account with code {0}")]
    AccountCodeNotFound(String),

    /// More than one account carries the given code.
    #[error("Account code {0} is used under more than one parent")]
    AmbiguousAccountCode(String),

    /// Account is inactive and cannot be posted to.
    #[error("Account {0} is inactive")]
    AccountInactive(AccountId),

    /// Code already used by a sibling.
    #[error("Account code {0} already exists under the same parent")]
    DuplicateAccountCode(String),

    /// Code or name is blank.
    #[error("Account {0} must not be blank")]
    BlankAccountField(&'static str),

    /// Child account type differs from its parent.
    #[error("Account type {child} does not match parent type {parent}")]
    AccountTypeMismatch {
        /// Parent account type.
        parent: AccountType,
        /// Requested child account type.
        child: AccountType,
    },

    /// Parent assignment would create a cycle.
    #[error("Setting parent of {account} to {parent} would create a cycle")]
    AccountCycle {
        /// The account being re-parented.
        account: AccountId,
        /// The requested parent.
        parent: AccountId,
    },

    /// Account type cannot be changed because it has postings.
    #[error("Cannot change account type for account {0} because it has postings")]
    AccountTypeChangeNotAllowed(AccountId),
}

impl LedgerError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::ImbalancedVoucher { .. } | Self::EmptyVoucher => "IMBALANCED_VOUCHER",
            Self::NegativeAmount => "NEGATIVE_AMOUNT",
            Self::InvalidPrecision(_) => "INVALID_PRECISION",
            Self::VoucherNotFound(_) => "VOUCHER_NOT_FOUND",
            Self::AccountNotFound(_) | Self::AccountCodeNotFound(_) => "ACCOUNT_NOT_FOUND",
            Self::AmbiguousAccountCode(_) => "AMBIGUOUS_ACCOUNT_CODE",
            Self::AccountInactive(_) => "ACCOUNT_INACTIVE",
            Self::DuplicateAccountCode(_) => "DUPLICATE_ACCOUNT_CODE",
            Self::BlankAccountField(_) => "BLANK_ACCOUNT_FIELD",
            Self::AccountTypeMismatch { .. } => "ACCOUNT_TYPE_MISMATCH",
            Self::AccountCycle { .. } => "ACCOUNT_CYCLE",
            Self::AccountTypeChangeNotAllowed(_) => "ACCOUNT_TYPE_CHANGE_NOT_ALLOWED",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::VoucherNotFound(_) | Self::AccountNotFound(_) | Self::AccountCodeNotFound(_) => {
                404
            }
            Self::DuplicateAccountCode(_) => 409,
            _ => 400,
        }
    }

    /// Returns true if the voucher was rejected for failing the balance rule.
    #[must_use]
    pub fn is_imbalanced(&self) -> bool {
        matches!(self, Self::ImbalancedVoucher { .. } | Self::EmptyVoucher)
    }
}

impl From<LedgerError> for bahi_shared::AppError {
    fn from(err: LedgerError) -> Self {
        Self::from_status(err.http_status_code(), err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            LedgerError::ImbalancedVoucher {
                debit: dec!(1.00),
                credit: dec!(0.50),
            }
            .error_code(),
            "IMBALANCED_VOUCHER"
        );
        assert_eq!(LedgerError::EmptyVoucher.error_code(), "IMBALANCED_VOUCHER");
        assert_eq!(
            LedgerError::AccountNotFound(AccountId::new()).error_code(),
            "ACCOUNT_NOT_FOUND"
        );
    }

    #[test]
    fn test_http_status_codes() {
        assert_eq!(LedgerError::EmptyVoucher.http_status_code(), 400);
        assert_eq!(
            LedgerError::AccountNotFound(AccountId::new()).http_status_code(),
            404
        );
        assert_eq!(
            LedgerError::DuplicateAccountCode("1000".into()).http_status_code(),
            409
        );
    }

    #[test]
    fn test_error_display() {
        let err = LedgerError::ImbalancedVoucher {
            debit: dec!(100.00),
            credit: dec!(50.00),
        };
        assert_eq!(
            err.to_string(),
            "Voucher is not balanced. Debit: 100.00, Credit: 50.00"
        );
        assert!(err.is_imbalanced());
    }
}
