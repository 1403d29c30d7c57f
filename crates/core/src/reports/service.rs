//! Report generation service.

use std::collections::HashMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use bahi_shared::types::AccountId;

use super::error::ReportError;
use super::types::{
    AccountStatement, BalanceSheetReport, DateRange, Posting, ProfitAndLossReport, ReportRow,
    StatementLine, TrialBalanceReport, TrialBalanceRow,
};
use crate::ledger::{Account, AccountTotals, AccountType};

/// Service for generating financial reports.
pub struct ReportService;

impl ReportService {
    /// Validates a reporting window.
    pub fn date_range(start: NaiveDate, end: NaiveDate) -> Result<DateRange, ReportError> {
        DateRange::new(start, end).ok_or(ReportError::InvalidDateRange { start, end })
    }

    /// Sums postings per account, keeping only those whose voucher date falls
    /// inside `range`. Passing `None` keeps everything.
    #[must_use]
    pub fn aggregate(
        postings: &[Posting],
        range: Option<DateRange>,
    ) -> HashMap<AccountId, AccountTotals> {
        let mut totals: HashMap<AccountId, AccountTotals> = HashMap::new();
        for posting in postings
            .iter()
            .filter(|p| range.is_none_or(|r| r.contains(p.date)))
        {
            totals
                .entry(posting.account_id)
                .or_default()
                .add(posting.debit, posting.credit);
        }
        totals
    }

    /// Sums postings dated on or before `as_of`.
    #[must_use]
    pub fn aggregate_as_of(
        postings: &[Posting],
        as_of: NaiveDate,
    ) -> HashMap<AccountId, AccountTotals> {
        let mut totals: HashMap<AccountId, AccountTotals> = HashMap::new();
        for posting in postings.iter().filter(|p| p.date <= as_of) {
            totals
                .entry(posting.account_id)
                .or_default()
                .add(posting.debit, posting.credit);
        }
        totals
    }

    /// Generates a trial balance.
    ///
    /// Every account appears, with zero totals when it has no activity in the
    /// window.
    pub fn trial_balance(
        accounts: &[Account],
        totals: &HashMap<AccountId, AccountTotals>,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<TrialBalanceReport, ReportError> {
        Self::date_range(start, end)?;

        let rows: Vec<TrialBalanceRow> = Self::sorted(accounts)
            .into_iter()
            .map(|account| {
                let t = totals.get(&account.id).copied().unwrap_or_default();
                TrialBalanceRow {
                    account_id: account.id,
                    code: account.code.clone(),
                    name: account.name.clone(),
                    account_type: account.account_type,
                    total_debit: t.debit,
                    total_credit: t.credit,
                }
            })
            .collect();

        let total_debit: Decimal = rows.iter().map(|r| r.total_debit).sum();
        let total_credit: Decimal = rows.iter().map(|r| r.total_credit).sum();

        Ok(TrialBalanceReport {
            start,
            end,
            rows,
            total_debit,
            total_credit,
            is_balanced: total_debit == total_credit,
        })
    }

    /// Generates a balance sheet from totals accumulated up to `as_of`.
    #[must_use]
    pub fn balance_sheet(
        accounts: &[Account],
        totals: &HashMap<AccountId, AccountTotals>,
        as_of: NaiveDate,
    ) -> BalanceSheetReport {
        let mut rows = Vec::new();
        let mut total_assets = Decimal::ZERO;
        let mut total_liabilities = Decimal::ZERO;
        let mut total_equity = Decimal::ZERO;
        let mut current_earnings = Decimal::ZERO;

        for account in Self::sorted(accounts) {
            let t = totals.get(&account.id).copied().unwrap_or_default();
            match account.account_type {
                AccountType::Asset => total_assets += t.net_debit(),
                AccountType::Liability => total_liabilities += t.net_credit(),
                AccountType::Equity => total_equity += t.net_credit(),
                AccountType::Revenue | AccountType::Expense => {
                    current_earnings += t.net_credit();
                    continue;
                }
            }
            rows.push(Self::row(account, t.net_debit()));
        }

        let liabilities_and_equity = total_liabilities + total_equity + current_earnings;

        BalanceSheetReport {
            as_of,
            rows,
            total_assets,
            total_liabilities,
            total_equity,
            current_earnings,
            liabilities_and_equity,
            is_balanced: total_assets == liabilities_and_equity,
        }
    }

    /// Generates a profit & loss statement for a window.
    pub fn profit_and_loss(
        accounts: &[Account],
        totals: &HashMap<AccountId, AccountTotals>,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<ProfitAndLossReport, ReportError> {
        Self::date_range(start, end)?;

        let mut revenue = Vec::new();
        let mut expenses = Vec::new();

        for account in Self::sorted(accounts) {
            let t = totals.get(&account.id).copied().unwrap_or_default();
            match account.account_type {
                AccountType::Revenue => revenue.push(Self::row(account, t.net_credit())),
                AccountType::Expense => expenses.push(Self::row(account, t.net_debit())),
                _ => {}
            }
        }

        let total_revenue: Decimal = revenue.iter().map(|r| r.value).sum();
        let total_expense: Decimal = expenses.iter().map(|r| r.value).sum();

        Ok(ProfitAndLossReport {
            start,
            end,
            revenue,
            expenses,
            total_revenue,
            total_expense,
            net_profit: total_revenue - total_expense,
        })
    }

    /// Builds an account statement.
    ///
    /// `opening` holds the account's totals before `start`. Lines run in
    /// voucher date order, then in the order vouchers were recorded. Postings
    /// outside the window or for other accounts are ignored.
    pub fn account_statement(
        account: &Account,
        opening: AccountTotals,
        postings: &[Posting],
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<AccountStatement, ReportError> {
        let range = Self::date_range(start, end)?;

        let mut in_window: Vec<&Posting> = postings
            .iter()
            .filter(|p| p.account_id == account.id && range.contains(p.date))
            .collect();
        in_window.sort_by(|a, b| {
            a.date
                .cmp(&b.date)
                .then_with(|| a.posted_at.cmp(&b.posted_at))
                .then_with(|| a.voucher_id.cmp(&b.voucher_id))
        });

        let opening_balance = opening.net_debit();
        let mut running = opening_balance;
        let lines = in_window
            .into_iter()
            .map(|p| {
                running += p.debit - p.credit;
                StatementLine {
                    voucher_id: p.voucher_id,
                    voucher_number: p.voucher_number.clone(),
                    date: p.date,
                    description: p.description.clone(),
                    debit: p.debit,
                    credit: p.credit,
                    running_balance: running,
                }
            })
            .collect();

        Ok(AccountStatement {
            account_id: account.id,
            code: account.code.clone(),
            name: account.name.clone(),
            start,
            end,
            opening_balance,
            lines,
            closing_balance: running,
        })
    }

    fn sorted(accounts: &[Account]) -> Vec<&Account> {
        let mut sorted: Vec<&Account> = accounts.iter().collect();
        sorted.sort_by(|a, b| a.code.cmp(&b.code));
        sorted
    }

    fn row(account: &Account, value: Decimal) -> ReportRow {
        ReportRow {
            account_id: account.id,
            code: account.code.clone(),
            name: account.name.clone(),
            account_type: account.account_type,
            value,
        }
    }
}
