//! Report repository for financial report database operations.
//!
//! Totals are summed in SQL per account and handed to
//! [`ReportService`] together with the chart, so every account appears in the
//! output even without activity.

use std::collections::HashMap;

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{DatabaseConnection, DbBackend, DbErr, FromQueryResult, Statement};
use uuid::Uuid;

use bahi_core::ledger::{Account, AccountTotals, LedgerError};
use bahi_core::reports::{
    AccountStatement, BalanceSheetReport, Posting, ProfitAndLossReport, ReportError,
    ReportService, TrialBalanceReport,
};
use bahi_shared::types::{AccountId, VoucherId};

use crate::repositories::account::{AccountError, AccountRepository};

/// Error types for report queries.
#[derive(Debug, thiserror::Error)]
pub enum ReportQueryError {
    /// Report parameters rejected.
    #[error(transparent)]
    Report(#[from] ReportError),

    /// Stored chart is unusable.
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl ReportQueryError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Report(e) => e.error_code(),
            Self::Ledger(e) => e.error_code(),
            Self::Database(_) => "DATABASE_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::Report(e) => e.http_status_code(),
            Self::Ledger(e) => e.http_status_code(),
            Self::Database(_) => 500,
        }
    }
}

impl From<AccountError> for ReportQueryError {
    fn from(err: AccountError) -> Self {
        match err {
            AccountError::Ledger(e) => Self::Ledger(e),
            AccountError::Database(e) => Self::Database(e),
        }
    }
}

impl From<ReportQueryError> for bahi_shared::AppError {
    fn from(err: ReportQueryError) -> Self {
        match err {
            ReportQueryError::Report(e) => e.into(),
            ReportQueryError::Ledger(e) => e.into(),
            ReportQueryError::Database(e) => Self::Database(e.to_string()),
        }
    }
}

const TOTALS_BETWEEN_SQL: &str = r"
SELECT ve.account_id, COALESCE(SUM(ve.debit), 0) AS debit, COALESCE(SUM(ve.credit), 0) AS credit
FROM voucher_entries ve
JOIN vouchers v ON v.id = ve.voucher_id
WHERE v.voucher_date BETWEEN $1 AND $2
GROUP BY ve.account_id
";

const TOTALS_AS_OF_SQL: &str = r"
SELECT ve.account_id, COALESCE(SUM(ve.debit), 0) AS debit, COALESCE(SUM(ve.credit), 0) AS credit
FROM voucher_entries ve
JOIN vouchers v ON v.id = ve.voucher_id
WHERE v.voucher_date <= $1
GROUP BY ve.account_id
";

const ACCOUNT_TOTALS_BEFORE_SQL: &str = r"
SELECT ve.account_id, COALESCE(SUM(ve.debit), 0) AS debit, COALESCE(SUM(ve.credit), 0) AS credit
FROM voucher_entries ve
JOIN vouchers v ON v.id = ve.voucher_id
WHERE ve.account_id = $1 AND v.voucher_date < $2
GROUP BY ve.account_id
";

const ACCOUNT_POSTINGS_SQL: &str = r"
SELECT v.id AS voucher_id,
       v.voucher_number,
       v.voucher_date,
       v.created_at,
       ve.account_id,
       ve.debit,
       ve.credit,
       COALESCE(ve.description, v.narration) AS description
FROM voucher_entries ve
JOIN vouchers v ON v.id = ve.voucher_id
WHERE ve.account_id = $1 AND v.voucher_date BETWEEN $2 AND $3
ORDER BY v.voucher_date, v.created_at, v.id, ve.line_no
";

#[derive(Debug, FromQueryResult)]
struct TotalsRow {
    account_id: Uuid,
    debit: Decimal,
    credit: Decimal,
}

#[derive(Debug, FromQueryResult)]
struct PostingRow {
    voucher_id: Uuid,
    voucher_number: String,
    voucher_date: NaiveDate,
    created_at: DateTime<FixedOffset>,
    account_id: Uuid,
    debit: Decimal,
    credit: Decimal,
    description: String,
}

/// Report repository for financial report queries.
#[derive(Debug, Clone)]
pub struct ReportRepository {
    db: DatabaseConnection,
}

impl ReportRepository {
    /// Creates a new report repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Trial balance over vouchers dated within `[start, end]`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidDateRange` when `start > end`.
    pub async fn trial_balance(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<TrialBalanceReport, ReportQueryError> {
        ReportService::date_range(start, end)?;
        let accounts = self.accounts().await?;
        let totals = self.totals_between(start, end).await?;
        Ok(ReportService::trial_balance(&accounts, &totals, start, end)?)
    }

    /// Balance sheet over vouchers dated on or before `as_of`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn balance_sheet(
        &self,
        as_of: NaiveDate,
    ) -> Result<BalanceSheetReport, ReportQueryError> {
        let accounts = self.accounts().await?;
        let totals = self
            .totals(Statement::from_sql_and_values(
                DbBackend::Postgres,
                TOTALS_AS_OF_SQL,
                [as_of.into()],
            ))
            .await?;
        Ok(ReportService::balance_sheet(&accounts, &totals, as_of))
    }

    /// Profit & loss over vouchers dated within `[start, end]`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidDateRange` when `start > end`.
    pub async fn profit_and_loss(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<ProfitAndLossReport, ReportQueryError> {
        ReportService::date_range(start, end)?;
        let accounts = self.accounts().await?;
        let totals = self.totals_between(start, end).await?;
        Ok(ReportService::profit_and_loss(&accounts, &totals, start, end)?)
    }

    /// Chronological statement for one account with running balance.
    ///
    /// # Errors
    ///
    /// Returns `AccountNotFound` for an unknown account and `InvalidDateRange`
    /// when `start > end`.
    pub async fn account_statement(
        &self,
        account_id: AccountId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<AccountStatement, ReportQueryError> {
        ReportService::date_range(start, end)?;

        let chart = AccountRepository::load_chart_in(&self.db).await?;
        let account = chart
            .get(account_id)
            .ok_or(ReportError::AccountNotFound(account_id))?;

        let opening = self
            .totals(Statement::from_sql_and_values(
                DbBackend::Postgres,
                ACCOUNT_TOTALS_BEFORE_SQL,
                [account_id.into_inner().into(), start.into()],
            ))
            .await?
            .remove(&account_id)
            .unwrap_or_default();

        let postings: Vec<Posting> = PostingRow::find_by_statement(Statement::from_sql_and_values(
            DbBackend::Postgres,
            ACCOUNT_POSTINGS_SQL,
            [account_id.into_inner().into(), start.into(), end.into()],
        ))
        .all(&self.db)
        .await?
        .into_iter()
        .map(|row| Posting {
            voucher_id: VoucherId::from_uuid(row.voucher_id),
            voucher_number: row.voucher_number,
            date: row.voucher_date,
            posted_at: row.created_at.with_timezone(&Utc),
            account_id: AccountId::from_uuid(row.account_id),
            debit: row.debit,
            credit: row.credit,
            description: row.description,
        })
        .collect();

        Ok(ReportService::account_statement(
            account, opening, &postings, start, end,
        )?)
    }

    async fn accounts(&self) -> Result<Vec<Account>, ReportQueryError> {
        let chart = AccountRepository::load_chart_in(&self.db).await?;
        Ok(chart.list(false).into_iter().cloned().collect())
    }

    async fn totals_between(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<HashMap<AccountId, AccountTotals>, DbErr> {
        self.totals(Statement::from_sql_and_values(
            DbBackend::Postgres,
            TOTALS_BETWEEN_SQL,
            [start.into(), end.into()],
        ))
        .await
    }

    async fn totals(
        &self,
        statement: Statement,
    ) -> Result<HashMap<AccountId, AccountTotals>, DbErr> {
        Ok(TotalsRow::find_by_statement(statement)
            .all(&self.db)
            .await?
            .into_iter()
            .map(|row| {
                (
                    AccountId::from_uuid(row.account_id),
                    AccountTotals::new(row.debit, row.credit),
                )
            })
            .collect())
    }
}
