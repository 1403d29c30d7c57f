//! Report data types.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use bahi_shared::types::{AccountId, VoucherId};

pub use bahi_shared::types::DateRange;

use crate::ledger::AccountType;

/// One stored posting with its voucher date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Posting {
    /// Owning voucher.
    pub voucher_id: VoucherId,
    /// Voucher number, for statements.
    pub voucher_number: String,
    /// Voucher date.
    pub date: NaiveDate,
    /// When the voucher was recorded. Orders postings within one date.
    pub posted_at: DateTime<Utc>,
    /// Account posted to.
    pub account_id: AccountId,
    /// Debit amount.
    pub debit: Decimal,
    /// Credit amount.
    pub credit: Decimal,
    /// Line description, falling back to the voucher narration.
    pub description: String,
}

/// Trial balance row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrialBalanceRow {
    /// Account ID.
    pub account_id: AccountId,
    /// Account code.
    pub code: String,
    /// Account name.
    pub name: String,
    /// Account type.
    pub account_type: AccountType,
    /// Total debit in the window.
    pub total_debit: Decimal,
    /// Total credit in the window.
    pub total_credit: Decimal,
}

/// Trial balance report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrialBalanceReport {
    /// Window start.
    pub start: NaiveDate,
    /// Window end.
    pub end: NaiveDate,
    /// One row per account, including accounts without activity.
    pub rows: Vec<TrialBalanceRow>,
    /// Sum of all debit columns.
    pub total_debit: Decimal,
    /// Sum of all credit columns.
    pub total_credit: Decimal,
    /// Whether debits equal credits.
    pub is_balanced: bool,
}

/// Row with a single net value (balance sheet and P&L).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportRow {
    /// Account ID.
    pub account_id: AccountId,
    /// Account code.
    pub code: String,
    /// Account name.
    pub name: String,
    /// Account type.
    pub account_type: AccountType,
    /// Net value.
    pub value: Decimal,
}

/// Balance sheet report.
///
/// Row values are `debit - credit` for every type. Section totals are shown
/// on each section's normal side, so liabilities and equity totals are
/// positive when the accounts carry their usual credit balance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BalanceSheetReport {
    /// As of date.
    pub as_of: NaiveDate,
    /// Asset, liability and equity rows ordered by code.
    pub rows: Vec<ReportRow>,
    /// Total assets.
    pub total_assets: Decimal,
    /// Total liabilities.
    pub total_liabilities: Decimal,
    /// Total equity.
    pub total_equity: Decimal,
    /// Revenue minus expense up to `as_of`, not yet closed into equity.
    pub current_earnings: Decimal,
    /// Liabilities plus equity plus current earnings.
    pub liabilities_and_equity: Decimal,
    /// Whether assets equal liabilities plus equity.
    pub is_balanced: bool,
}

/// Profit & loss report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfitAndLossReport {
    /// Window start.
    pub start: NaiveDate,
    /// Window end.
    pub end: NaiveDate,
    /// Revenue rows (`credit - debit`).
    pub revenue: Vec<ReportRow>,
    /// Expense rows (`debit - credit`).
    pub expenses: Vec<ReportRow>,
    /// Total revenue.
    pub total_revenue: Decimal,
    /// Total expense.
    pub total_expense: Decimal,
    /// Revenue minus expense.
    pub net_profit: Decimal,
}

impl ProfitAndLossReport {
    /// Revenue then expense rows, ordered by code within each group.
    #[must_use]
    pub fn rows(&self) -> Vec<&ReportRow> {
        self.revenue.iter().chain(self.expenses.iter()).collect()
    }
}

/// Account statement line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatementLine {
    /// Voucher ID.
    pub voucher_id: VoucherId,
    /// Voucher number.
    pub voucher_number: String,
    /// Voucher date.
    pub date: NaiveDate,
    /// Description.
    pub description: String,
    /// Debit amount.
    pub debit: Decimal,
    /// Credit amount.
    pub credit: Decimal,
    /// Running `debit - credit` balance after this line.
    pub running_balance: Decimal,
}

/// Account statement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountStatement {
    /// Account ID.
    pub account_id: AccountId,
    /// Account code.
    pub code: String,
    /// Account name.
    pub name: String,
    /// Window start.
    pub start: NaiveDate,
    /// Window end.
    pub end: NaiveDate,
    /// Balance carried from before `start`.
    pub opening_balance: Decimal,
    /// Lines in date order.
    pub lines: Vec<StatementLine>,
    /// Balance after the last line.
    pub closing_balance: Decimal,
}
