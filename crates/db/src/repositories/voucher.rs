//! Voucher repository for double-entry journal operations.
//!
//! A voucher and its entries are written in one database transaction after
//! [`LedgerService`] has accepted them; nothing is persisted for a rejected
//! voucher. A deferred trigger re-checks the balance at commit.

use std::collections::HashMap;

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    ModelTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use tracing::{debug, info};

use bahi_core::ledger::{CreateVoucherInput, LedgerError, LedgerService, VoucherType};
use bahi_shared::types::{AccountId, DateRange, PageRequest, PageResponse, VoucherEntryId, VoucherId};

use crate::entities::sea_orm_active_enums::VoucherType as StoredVoucherType;
use crate::entities::{accounts, voucher_entries, vouchers};
use crate::mapping::account_from_model;
use crate::repositories::sequence::SequenceRepository;

/// Error types for voucher operations.
#[derive(Debug, thiserror::Error)]
pub enum VoucherError {
    /// Voucher rejected by ledger validation.
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl VoucherError {
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

impl From<VoucherError> for bahi_shared::AppError {
    fn from(err: VoucherError) -> Self {
        match err {
            VoucherError::Ledger(e) => e.into(),
            VoucherError::Database(e) => Self::Database(e.to_string()),
        }
    }
}

/// A persisted voucher with its entries.
#[derive(Debug, Clone)]
pub struct Voucher {
    /// Voucher ID.
    pub id: VoucherId,
    /// Sequence-issued number, e.g. `RCT-2026-000001`.
    pub voucher_number: String,
    /// Voucher type tag.
    pub voucher_type: VoucherType,
    /// Voucher date.
    pub date: NaiveDate,
    /// Narration.
    pub narration: String,
    /// Sum of debits (equal to the sum of credits).
    pub total_amount: Decimal,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Entries in line order.
    pub entries: Vec<VoucherLine>,
}

/// A persisted voucher entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoucherLine {
    /// Entry ID.
    pub id: VoucherEntryId,
    /// Account posted to.
    pub account_id: AccountId,
    /// Position within the voucher, starting at 1.
    pub line_no: i32,
    /// Debit amount.
    pub debit: Decimal,
    /// Credit amount.
    pub credit: Decimal,
    /// Line description.
    pub description: Option<String>,
}

/// Filter options for listing vouchers.
#[derive(Debug, Clone, Default)]
pub struct VoucherFilter {
    /// Filter by voucher type.
    pub voucher_type: Option<VoucherType>,
    /// Filter by voucher date.
    pub dates: Option<DateRange>,
}

/// Voucher header row for list views.
#[derive(Debug, Clone)]
pub struct VoucherSummary {
    /// Voucher ID.
    pub id: VoucherId,
    /// Voucher number.
    pub voucher_number: String,
    /// Voucher type tag.
    pub voucher_type: VoucherType,
    /// Voucher date.
    pub date: NaiveDate,
    /// Narration.
    pub narration: String,
    /// Voucher total.
    pub total_amount: Decimal,
}

/// Voucher repository for journal operations.
#[derive(Debug, Clone)]
pub struct VoucherRepository {
    db: DatabaseConnection,
}

impl VoucherRepository {
    /// Creates a new voucher repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Validates and persists a voucher with all of its entries.
    ///
    /// # Errors
    ///
    /// Returns `ImbalancedVoucher`/`EmptyVoucher` when the lines do not
    /// balance, `AccountNotFound`/`AccountInactive` for bad accounts and
    /// `NegativeAmount`/`InvalidPrecision` for bad amounts.
    pub async fn create_voucher(&self, input: CreateVoucherInput) -> Result<Voucher, VoucherError> {
        let txn = self.db.begin().await?;
        let voucher = Self::create_voucher_in(&txn, &input).await?;
        txn.commit().await?;

        info!(
            voucher_id = %voucher.id,
            voucher_number = %voucher.voucher_number,
            total = %voucher.total_amount,
            "voucher created"
        );
        Ok(voucher)
    }

    /// Persists a voucher on an open transaction.
    ///
    /// Used by callers that must write the voucher together with other rows.
    ///
    /// # Errors
    ///
    /// See [`Self::create_voucher`].
    pub async fn create_voucher_in<C>(
        conn: &C,
        input: &CreateVoucherInput,
    ) -> Result<Voucher, VoucherError>
    where
        C: ConnectionTrait,
    {
        let referenced: Vec<uuid::Uuid> = input
            .entries
            .iter()
            .filter(|e| !e.is_blank())
            .filter_map(|e| e.account_id.map(AccountId::into_inner))
            .collect();

        let accounts: HashMap<AccountId, _> = accounts::Entity::find()
            .filter(accounts::Column::Id.is_in(referenced))
            .all(conn)
            .await?
            .into_iter()
            .map(|model| (AccountId::from_uuid(model.id), account_from_model(model, false)))
            .collect();

        let (entries, totals) =
            LedgerService::validate_voucher(input, |id| accounts.get(&id).cloned())?;

        let number = SequenceRepository::next_number_in(
            conn,
            input.voucher_type.number_prefix(),
            input.date.year(),
        )
        .await?;

        let now = Utc::now();
        let voucher_id = VoucherId::new();
        let header = vouchers::ActiveModel {
            id: Set(voucher_id.into_inner()),
            voucher_number: Set(number.to_string()),
            voucher_type: Set(input.voucher_type.into()),
            voucher_date: Set(input.date),
            narration: Set(input.narration.trim().to_string()),
            total_amount: Set(totals.total_debit),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        }
        .insert(conn)
        .await?;

        let mut lines = Vec::with_capacity(entries.len());
        for (idx, entry) in entries.into_iter().enumerate() {
            let line_no = i32::try_from(idx + 1).unwrap_or(i32::MAX);
            let model = voucher_entries::ActiveModel {
                id: Set(VoucherEntryId::new().into_inner()),
                voucher_id: Set(voucher_id.into_inner()),
                account_id: Set(entry.account_id.into_inner()),
                line_no: Set(line_no),
                debit: Set(entry.debit),
                credit: Set(entry.credit),
                description: Set(entry.description),
                created_at: Set(now.into()),
            }
            .insert(conn)
            .await?;
            lines.push(line_from_model(model));
        }

        Ok(voucher_from_model(header, lines))
    }

    /// Gets a voucher with its entries.
    ///
    /// # Errors
    ///
    /// Returns `VoucherNotFound` if no such voucher exists.
    pub async fn get_voucher(&self, id: VoucherId) -> Result<Voucher, VoucherError> {
        let header = vouchers::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await?
            .ok_or(LedgerError::VoucherNotFound(id.into_inner()))?;

        let lines = header
            .find_related(voucher_entries::Entity)
            .order_by_asc(voucher_entries::Column::LineNo)
            .all(&self.db)
            .await?
            .into_iter()
            .map(line_from_model)
            .collect();

        Ok(voucher_from_model(header, lines))
    }

    /// Lists vouchers, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_vouchers(
        &self,
        filter: &VoucherFilter,
        page: &PageRequest,
    ) -> Result<PageResponse<VoucherSummary>, VoucherError> {
        let mut query = vouchers::Entity::find();
        if let Some(voucher_type) = filter.voucher_type {
            query = query.filter(vouchers::Column::VoucherType.eq(StoredVoucherType::from(voucher_type)));
        }
        if let Some(range) = filter.dates {
            query = query
                .filter(vouchers::Column::VoucherDate.gte(range.start))
                .filter(vouchers::Column::VoucherDate.lte(range.end));
        }

        let total = query.clone().count(&self.db).await?;

        let data = query
            .order_by_desc(vouchers::Column::VoucherDate)
            .order_by_desc(vouchers::Column::VoucherNumber)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await?
            .into_iter()
            .map(|model| VoucherSummary {
                id: VoucherId::from_uuid(model.id),
                voucher_number: model.voucher_number,
                voucher_type: model.voucher_type.into(),
                date: model.voucher_date,
                narration: model.narration,
                total_amount: model.total_amount,
            })
            .collect();

        Ok(PageResponse::new(data, page.page, page.per_page, total))
    }

    /// Deletes a voucher; its entries go with it.
    ///
    /// # Errors
    ///
    /// Returns `VoucherNotFound` if no such voucher exists.
    pub async fn delete_voucher(&self, id: VoucherId) -> Result<(), VoucherError> {
        let result = vouchers::Entity::delete_by_id(id.into_inner())
            .exec(&self.db)
            .await?;

        if result.rows_affected == 0 {
            debug!(voucher_id = %id, "voucher already absent");
            return Err(LedgerError::VoucherNotFound(id.into_inner()).into());
        }

        info!(voucher_id = %id, "voucher deleted");
        Ok(())
    }
}

fn line_from_model(model: voucher_entries::Model) -> VoucherLine {
    VoucherLine {
        id: VoucherEntryId::from_uuid(model.id),
        account_id: AccountId::from_uuid(model.account_id),
        line_no: model.line_no,
        debit: model.debit,
        credit: model.credit,
        description: model.description,
    }
}

fn voucher_from_model(model: vouchers::Model, entries: Vec<VoucherLine>) -> Voucher {
    Voucher {
        id: VoucherId::from_uuid(model.id),
        voucher_number: model.voucher_number,
        voucher_type: model.voucher_type.into(),
        date: model.voucher_date,
        narration: model.narration,
        total_amount: model.total_amount,
        created_at: model.created_at.with_timezone(&Utc),
        entries,
    }
}
