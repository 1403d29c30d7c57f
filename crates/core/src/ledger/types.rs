//! Ledger domain types for voucher creation and validation.
//!
//! This module defines the core types used for creating and validating
//! vouchers in the double-entry bookkeeping system.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use bahi_shared::types::AccountId;

use super::balance::NormalBalance;

/// Account classification.
///
/// INCOME and REVENUE are the same classification and both parse to `Revenue`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AccountType {
    /// Things the business owns.
    Asset,
    /// Things the business owes.
    Liability,
    /// Owner's stake.
    Equity,
    /// Income from sales and services.
    Revenue,
    /// Costs incurred.
    Expense,
}

impl AccountType {
    /// All account types in reporting order.
    pub const ALL: [Self; 5] = [
        Self::Asset,
        Self::Liability,
        Self::Equity,
        Self::Revenue,
        Self::Expense,
    ];

    /// Returns the string representation of the type.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Asset => "ASSET",
            Self::Liability => "LIABILITY",
            Self::Equity => "EQUITY",
            Self::Revenue => "REVENUE",
            Self::Expense => "EXPENSE",
        }
    }

    /// Parses an account type, accepting `INCOME` as an alias of `REVENUE`.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "ASSET" => Some(Self::Asset),
            "LIABILITY" => Some(Self::Liability),
            "EQUITY" => Some(Self::Equity),
            "REVENUE" | "INCOME" => Some(Self::Revenue),
            "EXPENSE" => Some(Self::Expense),
            _ => None,
        }
    }

    /// Returns which side increases this account.
    #[must_use]
    pub fn normal_balance(&self) -> NormalBalance {
        match self {
            Self::Asset | Self::Expense => NormalBalance::Debit,
            Self::Liability | Self::Equity | Self::Revenue => NormalBalance::Credit,
        }
    }

    /// Returns true for accounts reported on the balance sheet.
    #[must_use]
    pub fn is_balance_sheet(&self) -> bool {
        matches!(self, Self::Asset | Self::Liability | Self::Equity)
    }

    /// Returns true for accounts reported on the profit & loss statement.
    #[must_use]
    pub fn is_profit_and_loss(&self) -> bool {
        matches!(self, Self::Revenue | Self::Expense)
    }
}

impl fmt::Display for AccountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Voucher type tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoucherType {
    /// Money paid out.
    Payment,
    /// Money received.
    Receipt,
    /// Sale of goods or services.
    Sales,
    /// Purchase of goods or services.
    Purchase,
    /// General journal entry.
    Journal,
    /// Transfer between cash and bank.
    Contra,
    /// Debit note issued to a supplier.
    DebitNote,
    /// Credit note issued to a customer.
    CreditNote,
    /// Manual adjustment.
    Adjustment,
}

impl VoucherType {
    /// Returns the string representation of the type.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Payment => "payment",
            Self::Receipt => "receipt",
            Self::Sales => "sales",
            Self::Purchase => "purchase",
            Self::Journal => "journal",
            Self::Contra => "contra",
            Self::DebitNote => "debit_note",
            Self::CreditNote => "credit_note",
            Self::Adjustment => "adjustment",
        }
    }

    /// Parses a voucher type from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "payment" => Some(Self::Payment),
            "receipt" => Some(Self::Receipt),
            "sales" => Some(Self::Sales),
            "purchase" => Some(Self::Purchase),
            "journal" => Some(Self::Journal),
            "contra" => Some(Self::Contra),
            "debit_note" => Some(Self::DebitNote),
            "credit_note" => Some(Self::CreditNote),
            "adjustment" => Some(Self::Adjustment),
            _ => None,
        }
    }

    /// Prefix used when numbering vouchers of this type.
    #[must_use]
    pub fn number_prefix(&self) -> &'static str {
        match self {
            Self::Payment => "PAY",
            Self::Receipt => "RCT",
            Self::Sales => "SAL",
            Self::Purchase => "PUR",
            Self::Journal => "JRN",
            Self::Contra => "CTR",
            Self::DebitNote => "DBN",
            Self::CreditNote => "CRN",
            Self::Adjustment => "ADJ",
        }
    }
}

impl fmt::Display for VoucherType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Input for a single voucher line.
///
/// Lines with no account, or with both sides zero, are dropped before
/// validation rather than rejected.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoucherEntryInput {
    /// The account to post to.
    pub account_id: Option<AccountId>,
    /// Debit amount (two decimal places, >= 0).
    pub debit: Decimal,
    /// Credit amount (two decimal places, >= 0).
    pub credit: Decimal,
    /// Optional line description.
    pub description: Option<String>,
}

impl VoucherEntryInput {
    /// Creates a debit line.
    #[must_use]
    pub fn debit(account_id: AccountId, amount: Decimal) -> Self {
        Self {
            account_id: Some(account_id),
            debit: amount,
            credit: Decimal::ZERO,
            description: None,
        }
    }

    /// Creates a credit line.
    #[must_use]
    pub fn credit(account_id: AccountId, amount: Decimal) -> Self {
        Self {
            account_id: Some(account_id),
            debit: Decimal::ZERO,
            credit: amount,
            description: None,
        }
    }

    /// Attaches a description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Returns true if the line carries no posting.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.account_id.is_none() || (self.debit.is_zero() && self.credit.is_zero())
    }
}

/// Input for creating a voucher.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateVoucherInput {
    /// Voucher date.
    pub date: NaiveDate,
    /// Free-text narration.
    pub narration: String,
    /// Voucher type tag.
    pub voucher_type: VoucherType,
    /// Voucher lines.
    pub entries: Vec<VoucherEntryInput>,
}

/// A validated voucher line ready to persist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedEntry {
    /// The account to post to.
    pub account_id: AccountId,
    /// Debit amount.
    pub debit: Decimal,
    /// Credit amount.
    pub credit: Decimal,
    /// Optional line description.
    pub description: Option<String>,
}

/// Voucher totals for validation and display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VoucherTotals {
    /// Sum of debits.
    pub total_debit: Decimal,
    /// Sum of credits.
    pub total_credit: Decimal,
    /// Whether the voucher is balanced (debits == credits).
    pub is_balanced: bool,
}

impl VoucherTotals {
    /// Creates new totals from debit and credit sums.
    #[must_use]
    pub fn new(total_debit: Decimal, total_credit: Decimal) -> Self {
        Self {
            total_debit,
            total_credit,
            is_balanced: total_debit == total_credit,
        }
    }

    /// Returns the difference between debits and credits.
    #[must_use]
    pub fn difference(&self) -> Decimal {
        self.total_debit - self.total_credit
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_account_type_parse_accepts_income_alias() {
        assert_eq!(AccountType::parse("income"), Some(AccountType::Revenue));
        assert_eq!(AccountType::parse(" Revenue "), Some(AccountType::Revenue));
        assert_eq!(AccountType::parse("ASSET"), Some(AccountType::Asset));
        assert_eq!(AccountType::parse("cash"), None);
    }

    #[test]
    fn test_account_type_report_membership() {
        assert!(AccountType::Asset.is_balance_sheet());
        assert!(AccountType::Equity.is_balance_sheet());
        assert!(!AccountType::Revenue.is_balance_sheet());
        assert!(AccountType::Expense.is_profit_and_loss());
        assert!(!AccountType::Liability.is_profit_and_loss());
    }

    #[test]
    fn test_voucher_type_round_trip() {
        for vt in [
            VoucherType::Payment,
            VoucherType::Receipt,
            VoucherType::Sales,
            VoucherType::Purchase,
            VoucherType::Journal,
            VoucherType::Contra,
            VoucherType::DebitNote,
            VoucherType::CreditNote,
            VoucherType::Adjustment,
        ] {
            assert_eq!(VoucherType::parse(vt.as_str()), Some(vt));
        }
    }

    #[test]
    fn test_blank_lines() {
        let id = AccountId::new();
        assert!(VoucherEntryInput::debit(id, Decimal::ZERO).is_blank());
        assert!(!VoucherEntryInput::debit(id, dec!(1)).is_blank());

        let mut no_account = VoucherEntryInput::credit(id, dec!(5));
        no_account.account_id = None;
        assert!(no_account.is_blank());
    }

    #[test]
    fn test_voucher_totals() {
        let totals = VoucherTotals::new(dec!(100.00), dec!(100.00));
        assert!(totals.is_balanced);
        assert_eq!(totals.difference(), Decimal::ZERO);

        let totals = VoucherTotals::new(dec!(100.00), dec!(50.00));
        assert!(!totals.is_balanced);
        assert_eq!(totals.difference(), dec!(50.00));
    }
}
