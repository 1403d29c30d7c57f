//! Account repository for chart of accounts database operations.
//!
//! The chart is small, so edits load it whole, let
//! [`ChartOfAccounts`](bahi_core::ledger::ChartOfAccounts) validate the change
//! and write the single affected row back inside the same transaction.

use std::collections::HashSet;

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ConnectionTrait, DatabaseConnection, DbBackend, DbErr, EntityTrait,
    FromQueryResult, QueryOrder, Set, Statement, TransactionTrait,
};
use tracing::info;
use uuid::Uuid;

use bahi_core::ledger::{Account, AccountType, ChartOfAccounts, LedgerError, NewAccount};
use bahi_shared::types::AccountId;

use crate::entities::accounts;
use crate::lock::lock_chart;
use crate::mapping::account_from_model;

/// Error types for account operations.
#[derive(Debug, thiserror::Error)]
pub enum AccountError {
    /// Chart rule violated.
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl AccountError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Ledger(e) => e.error_code(),
            Self::Database(_) => "DATABASE_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::Ledger(e) => e.http_status_code(),
            Self::Database(_) => 500,
        }
    }
}

impl From<AccountError> for bahi_shared::AppError {
    fn from(err: AccountError) -> Self {
        match err {
            AccountError::Ledger(e) => e.into(),
            AccountError::Database(e) => Self::Database(e.to_string()),
        }
    }
}

#[derive(Debug, FromQueryResult)]
struct PostedAccount {
    account_id: Uuid,
}

/// Account repository for chart of accounts operations.
#[derive(Debug, Clone)]
pub struct AccountRepository {
    db: DatabaseConnection,
}

impl AccountRepository {
    /// Creates a new account repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Loads the whole chart, flagging accounts that carry postings.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails or the stored rows do
    /// not form a valid chart.
    pub async fn load_chart_in<C>(conn: &C) -> Result<ChartOfAccounts, AccountError>
    where
        C: ConnectionTrait,
    {
        let models = accounts::Entity::find()
            .order_by_asc(accounts::Column::Code)
            .all(conn)
            .await?;

        let posted: HashSet<Uuid> = PostedAccount::find_by_statement(Statement::from_string(
            DbBackend::Postgres,
            "SELECT DISTINCT account_id FROM voucher_entries",
        ))
        .all(conn)
        .await?
        .into_iter()
        .map(|row| row.account_id)
        .collect();

        let accounts = models
            .into_iter()
            .map(|model| {
                let has_postings = posted.contains(&model.id);
                account_from_model(model, has_postings)
            })
            .collect();

        Ok(ChartOfAccounts::from_accounts(accounts)?)
    }

    /// Loads the whole chart.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn load_chart(&self) -> Result<ChartOfAccounts, AccountError> {
        Self::load_chart_in(&self.db).await
    }

    /// Creates an account after chart validation.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateAccountCode`, `AccountNotFound` (parent) or
    /// `AccountTypeMismatch` when the chart rejects the account.
    pub async fn create_account(&self, input: NewAccount) -> Result<Account, AccountError> {
        let txn = self.db.begin().await?;
        lock_chart(&txn).await?;

        let chart = Self::load_chart_in(&txn).await?;
        chart.validate_new(&input)?;

        let now = Utc::now().into();
        let model = accounts::ActiveModel {
            id: Set(AccountId::new().into_inner()),
            code: Set(input.code.trim().to_string()),
            name: Set(input.name.trim().to_string()),
            account_type: Set(input.account_type.into()),
            parent_id: Set(input.parent_id.map(AccountId::into_inner)),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;

        info!(account_id = %model.id, code = %model.code, "account created");
        Ok(account_from_model(model, false))
    }

    /// Lists accounts ordered by code, optionally only active ones.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_accounts(&self, active_only: bool) -> Result<Vec<Account>, AccountError> {
        let chart = self.load_chart().await?;
        Ok(chart.list(active_only).into_iter().cloned().collect())
    }

    /// Finds an account by id.
    ///
    /// # Errors
    ///
    /// Returns `AccountNotFound` if no such account exists.
    pub async fn find_account(&self, id: AccountId) -> Result<Account, AccountError> {
        let chart = self.load_chart().await?;
        Ok(chart.require(id)?.clone())
    }

    /// Finds an account by code.
    ///
    /// # Errors
    ///
    /// Returns `AccountCodeNotFound`, or `AmbiguousAccountCode` when the code
    /// is used under several parents.
    pub async fn find_by_code(&self, code: &str) -> Result<Account, AccountError> {
        let chart = self.load_chart().await?;
        Ok(chart.find_by_code(code)?.clone())
    }

    /// Returns the direct children of an account.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn children(&self, id: AccountId) -> Result<Vec<Account>, AccountError> {
        let chart = self.load_chart().await?;
        chart.require(id)?;
        Ok(chart.children(id).into_iter().cloned().collect())
    }

    /// Returns the ancestors of an account, nearest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn ancestors(&self, id: AccountId) -> Result<Vec<Account>, AccountError> {
        let chart = self.load_chart().await?;
        chart.require(id)?;
        Ok(chart.ancestors(id).into_iter().cloned().collect())
    }

    /// Moves an account under a new parent, or to the root.
    ///
    /// # Errors
    ///
    /// Returns `AccountCycle` when the parent is the account itself or one of
    /// its descendants.
    pub async fn set_parent(
        &self,
        id: AccountId,
        parent_id: Option<AccountId>,
    ) -> Result<Account, AccountError> {
        let txn = self.db.begin().await?;
        lock_chart(&txn).await?;

        let mut chart = Self::load_chart_in(&txn).await?;
        chart.set_parent(id, parent_id)?;

        let model = accounts::ActiveModel {
            id: Set(id.into_inner()),
            parent_id: Set(parent_id.map(AccountId::into_inner)),
            updated_at: Set(Utc::now().into()),
            ..Default::default()
        }
        .update(&txn)
        .await?;

        txn.commit().await?;

        info!(account_id = %id, parent_id = ?parent_id, "account moved");
        Ok(Self::reloaded(&chart, id, model))
    }

    /// Activates or deactivates an account.
    ///
    /// # Errors
    ///
    /// Returns `AccountNotFound` if no such account exists.
    pub async fn set_active(&self, id: AccountId, is_active: bool) -> Result<Account, AccountError> {
        let txn = self.db.begin().await?;
        lock_chart(&txn).await?;

        let mut chart = Self::load_chart_in(&txn).await?;
        chart.set_active(id, is_active)?;

        let model = accounts::ActiveModel {
            id: Set(id.into_inner()),
            is_active: Set(is_active),
            updated_at: Set(Utc::now().into()),
            ..Default::default()
        }
        .update(&txn)
        .await?;

        txn.commit().await?;

        info!(account_id = %id, is_active, "account activation changed");
        Ok(Self::reloaded(&chart, id, model))
    }

    /// Changes an account's type.
    ///
    /// # Errors
    ///
    /// Returns `AccountTypeChangeNotAllowed` once the account has postings.
    pub async fn change_type(
        &self,
        id: AccountId,
        account_type: AccountType,
    ) -> Result<Account, AccountError> {
        let txn = self.db.begin().await?;
        lock_chart(&txn).await?;

        let mut chart = Self::load_chart_in(&txn).await?;
        chart.change_type(id, account_type)?;

        let model = accounts::ActiveModel {
            id: Set(id.into_inner()),
            account_type: Set(account_type.into()),
            updated_at: Set(Utc::now().into()),
            ..Default::default()
        }
        .update(&txn)
        .await?;

        txn.commit().await?;

        info!(account_id = %id, account_type = %account_type, "account type changed");
        Ok(Self::reloaded(&chart, id, model))
    }

    fn reloaded(chart: &ChartOfAccounts, id: AccountId, model: accounts::Model) -> Account {
        let has_postings = chart.get(id).is_some_and(|a| a.has_postings);
        account_from_model(model, has_postings)
    }
}
