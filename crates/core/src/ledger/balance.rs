//! Account balance arithmetic.
//!
//! - Asset/Expense: balance moves with debit - credit (debit-normal)
//! - Liability/Equity/Revenue: balance moves with credit - debit (credit-normal)

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The side that increases an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NormalBalance {
    /// Debit-normal accounts (Asset, Expense).
    Debit,
    /// Credit-normal accounts (Liability, Equity, Revenue).
    Credit,
}

impl NormalBalance {
    /// Calculates the balance change for a posting.
    #[must_use]
    pub fn balance_change(self, debit: Decimal, credit: Decimal) -> Decimal {
        match self {
            Self::Debit => debit - credit,
            Self::Credit => credit - debit,
        }
    }
}

/// Aggregated debit and credit activity for one account.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountTotals {
    /// Total debit amount.
    pub debit: Decimal,
    /// Total credit amount.
    pub credit: Decimal,
}

impl AccountTotals {
    /// Creates totals from known sums.
    #[must_use]
    pub const fn new(debit: Decimal, credit: Decimal) -> Self {
        Self { debit, credit }
    }

    /// Adds one posting.
    pub fn add(&mut self, debit: Decimal, credit: Decimal) {
        self.debit += debit;
        self.credit += credit;
    }

    /// Debit minus credit.
    #[must_use]
    pub fn net_debit(&self) -> Decimal {
        self.debit - self.credit
    }

    /// Credit minus debit.
    #[must_use]
    pub fn net_credit(&self) -> Decimal {
        self.credit - self.debit
    }
}
