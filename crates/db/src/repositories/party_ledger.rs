//! Party ledger repository for customer and supplier running balances.
//!
//! Every entry is appended in the same transaction that updates the ledger
//! row, with the ledger row locked for the duration. A payment entry also
//! allocates the payment across the party's outstanding items and can post
//! the matching cash movement voucher, all before the commit.

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, TransactionTrait,
};
use tracing::{debug, info};

use bahi_core::documents::TransactionFacts;
use bahi_core::ledger::{CreateVoucherInput, VoucherEntryInput, VoucherType};
use bahi_core::outstanding::PaymentDetails;
use bahi_core::party::{
    NewPartyLedger, PartyAddress, PartyDashboard, PartyKind, PartyLedger,
    PartyLedgerEntry, PartyLedgerError, PartyLedgerService, PartyLedgerStatus, normalize_phone,
};
use bahi_shared::config::AccountCodesConfig;
use bahi_shared::types::{DateRange, PageRequest, PageResponse, PartyLedgerId};

use crate::entities::sea_orm_active_enums::{
    PartyEntryKind as StoredEntryKind, PartyKind as StoredPartyKind,
};
use crate::entities::{party_ledger_entries, party_ledgers};
use crate::lock::lock_key;
use crate::mapping::{
    party_entry_from_model, party_entry_to_active, party_ledger_from_model, party_ledger_to_active,
};
use crate::repositories::account::{AccountError, AccountRepository};
use crate::repositories::outstanding::OutstandingRepoError;
use crate::repositories::payment::{PaymentInput, PaymentRepository, PaymentResult};
use crate::repositories::voucher::{Voucher, VoucherError, VoucherRepository};

/// Error types for party ledger persistence.
#[derive(Debug, thiserror::Error)]
pub enum PartyLedgerRepoError {
    /// Ledger rule violated.
    #[error(transparent)]
    PartyLedger(#[from] PartyLedgerError),

    /// Allocating the payment failed.
    #[error(transparent)]
    Outstanding(#[from] OutstandingRepoError),

    /// The cash movement voucher was rejected.
    #[error(transparent)]
    Voucher(#[from] VoucherError),

    /// The cash movement accounts could not be resolved.
    #[error(transparent)]
    Account(#[from] AccountError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl PartyLedgerRepoError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::PartyLedger(e) => e.error_code(),
            Self::Outstanding(e) => e.error_code(),
            Self::Voucher(e) => e.error_code(),
            Self::Account(e) => e.error_code(),
            Self::Database(_) => "DATABASE_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::PartyLedger(e) => e.http_status_code(),
            Self::Outstanding(e) => e.http_status_code(),
            Self::Voucher(e) => e.http_status_code(),
            Self::Account(e) => e.http_status_code(),
            Self::Database(_) => 500,
        }
    }
}

impl From<PartyLedgerRepoError> for bahi_shared::AppError {
    fn from(err: PartyLedgerRepoError) -> Self {
        match err {
            PartyLedgerRepoError::PartyLedger(e) => e.into(),
            PartyLedgerRepoError::Outstanding(e) => e.into(),
            PartyLedgerRepoError::Voucher(e) => e.into(),
            PartyLedgerRepoError::Account(e) => e.into(),
            PartyLedgerRepoError::Database(e) => Self::Database(e.to_string()),
        }
    }
}

/// A payment to record on a party ledger.
#[derive(Debug, Clone)]
pub struct PaymentEntryInput {
    /// Amount received or paid.
    pub amount: Decimal,
    /// Method, reference and notes.
    pub details: PaymentDetails,
    /// Business date of the payment.
    pub entry_date: NaiveDate,
    /// Also post a Receipt/Payment voucher for the cash movement.
    pub record_cash_movement: bool,
}

/// Everything a payment entry wrote.
#[derive(Debug, Clone)]
pub struct PaymentEntryResult {
    /// Ledger after the payment.
    pub ledger: PartyLedger,
    /// The credit entry.
    pub entry: PartyLedgerEntry,
    /// How the payment was spread over outstanding items.
    pub allocation: PaymentResult,
    /// Cash movement voucher, when requested.
    pub voucher: Option<Voucher>,
}

/// Counters from a ledger backfill.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BackfillReport {
    /// Ledgers opened for parties seen for the first time.
    pub ledgers_created: u64,
    /// Invoice entries appended.
    pub entries_created: u64,
    /// Documents left alone: unconfirmed, without a phone, or already posted.
    pub skipped: u64,
}

/// Party ledger repository.
#[derive(Debug, Clone)]
pub struct PartyLedgerRepository {
    db: DatabaseConnection,
}

impl PartyLedgerRepository {
    /// Creates a new party ledger repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    // ========================================================================
    // Ledgers
    // ========================================================================

    /// Returns the ledger for `(kind, phone)`, opening it if needed.
    ///
    /// # Errors
    ///
    /// Returns `BlankField`, `InvalidPhone` or `InvalidAmount` for bad input.
    pub async fn find_or_create(
        &self,
        input: NewPartyLedger,
    ) -> Result<PartyLedger, PartyLedgerRepoError> {
        let txn = self.db.begin().await?;
        let (ledger, created) = Self::find_or_create_in(&txn, input).await?;
        txn.commit().await?;

        if created {
            info!(
                ledger_id = %ledger.id,
                kind = %ledger.kind,
                party = %ledger.phone,
                opening_balance = %ledger.opening_balance,
                "party ledger opened"
            );
        }
        Ok(ledger)
    }

    async fn find_or_create_in<C>(
        conn: &C,
        input: NewPartyLedger,
    ) -> Result<(PartyLedger, bool), PartyLedgerRepoError>
    where
        C: ConnectionTrait,
    {
        let ledger = PartyLedgerService::open(input, Utc::now())?;
        lock_key(conn, &format!("party_ledger:{}:{}", ledger.kind, ledger.phone)).await?;

        if let Some(existing) = party_ledgers::Entity::find()
            .filter(party_ledgers::Column::Kind.eq(StoredPartyKind::from(ledger.kind)))
            .filter(party_ledgers::Column::Phone.eq(ledger.phone.as_str()))
            .one(conn)
            .await?
        {
            debug!(ledger_id = %existing.id, "party ledger already exists");
            return Ok((party_ledger_from_model(existing), false));
        }

        party_ledger_to_active(&ledger).insert(conn).await?;
        Ok((ledger, true))
    }

    /// Finds a ledger by id.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no such ledger exists.
    pub async fn find_by_id(&self, id: PartyLedgerId) -> Result<PartyLedger, PartyLedgerRepoError> {
        party_ledgers::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await?
            .map(party_ledger_from_model)
            .ok_or_else(|| PartyLedgerError::NotFound(id).into())
    }

    /// Finds a ledger by kind and phone in any format.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_phone(
        &self,
        kind: PartyKind,
        phone: &str,
    ) -> Result<Option<PartyLedger>, PartyLedgerRepoError> {
        Ok(party_ledgers::Entity::find()
            .filter(party_ledgers::Column::Kind.eq(StoredPartyKind::from(kind)))
            .filter(party_ledgers::Column::Phone.eq(normalize_phone(phone)))
            .one(&self.db)
            .await?
            .map(party_ledger_from_model))
    }

    async fn lock_ledger<C>(conn: &C, id: PartyLedgerId) -> Result<PartyLedger, PartyLedgerRepoError>
    where
        C: ConnectionTrait,
    {
        party_ledgers::Entity::find_by_id(id.into_inner())
            .lock_exclusive()
            .one(conn)
            .await?
            .map(party_ledger_from_model)
            .ok_or_else(|| PartyLedgerError::NotFound(id).into())
    }

    async fn append<C>(
        conn: &C,
        ledger: &PartyLedger,
        entry: &PartyLedgerEntry,
        voucher_id: Option<uuid::Uuid>,
    ) -> Result<(), DbErr>
    where
        C: ConnectionTrait,
    {
        party_ledger_to_active(ledger).update(conn).await?;
        party_entry_to_active(entry, voucher_id).insert(conn).await?;
        Ok(())
    }

    /// Changes a ledger's status.
    ///
    /// # Errors
    ///
    /// Returns `InvalidStatusTransition` when the lifecycle forbids it.
    pub async fn set_status(
        &self,
        id: PartyLedgerId,
        to: PartyLedgerStatus,
    ) -> Result<PartyLedger, PartyLedgerRepoError> {
        let txn = self.db.begin().await?;
        let mut ledger = Self::lock_ledger(&txn, id).await?;
        let from = ledger.status;
        PartyLedgerService::set_status(&mut ledger, to, Utc::now())?;
        party_ledger_to_active(&ledger).update(&txn).await?;
        txn.commit().await?;

        info!(ledger_id = %id, %from, %to, "party ledger status changed");
        Ok(ledger)
    }

    // ========================================================================
    // Entries
    // ========================================================================

    /// Posts a document's amount as a debit.
    ///
    /// A document that already has an invoice entry on this ledger is not
    /// posted twice; the existing entry is returned.
    ///
    /// # Errors
    ///
    /// Returns `NotFound`, `Suspended` or `InvalidAmount`.
    pub async fn add_invoice_entry(
        &self,
        ledger_id: PartyLedgerId,
        document: &impl TransactionFacts,
        amount: Decimal,
    ) -> Result<PartyLedgerEntry, PartyLedgerRepoError> {
        let txn = self.db.begin().await?;
        let (entry, created) = Self::add_invoice_entry_in(&txn, ledger_id, document, amount).await?;
        txn.commit().await?;

        if created {
            info!(
                ledger_id = %ledger_id,
                entry_id = %entry.id,
                reference = %document.reference_number(),
                debit = %entry.debit,
                balance = %entry.balance_after,
                "invoice entry added"
            );
        }
        Ok(entry)
    }

    async fn add_invoice_entry_in<C>(
        conn: &C,
        ledger_id: PartyLedgerId,
        document: &impl TransactionFacts,
        amount: Decimal,
    ) -> Result<(PartyLedgerEntry, bool), PartyLedgerRepoError>
    where
        C: ConnectionTrait,
    {
        let mut ledger = Self::lock_ledger(conn, ledger_id).await?;

        if let Some(existing) = party_ledger_entries::Entity::find()
            .filter(party_ledger_entries::Column::LedgerId.eq(ledger_id.into_inner()))
            .filter(party_ledger_entries::Column::EntryKind.eq(StoredEntryKind::Invoice))
            .filter(party_ledger_entries::Column::ReferenceType.eq(document.reference_type()))
            .filter(party_ledger_entries::Column::ReferenceId.eq(document.reference_id()))
            .one(conn)
            .await?
        {
            debug!(
                ledger_id = %ledger_id,
                reference_id = %document.reference_id(),
                "invoice entry already posted"
            );
            return Ok((party_entry_from_model(existing), false));
        }

        let entry = PartyLedgerService::add_invoice_entry(&mut ledger, document, amount, Utc::now())?;
        Self::append(conn, &ledger, &entry, None).await?;
        Ok((entry, true))
    }

    /// Records a payment, allocates it to the party's outstanding items and
    /// optionally posts the cash movement voucher, all in one transaction.
    ///
    /// # Errors
    ///
    /// Returns `NotFound`, `Suspended` or `InvalidAmount` for the ledger, and
    /// voucher or account errors when the cash movement cannot be posted.
    /// Nothing is written on error.
    pub async fn add_payment_entry(
        &self,
        ledger_id: PartyLedgerId,
        input: &PaymentEntryInput,
        accounts: &AccountCodesConfig,
    ) -> Result<PaymentEntryResult, PartyLedgerRepoError> {
        let txn = self.db.begin().await?;
        let now = Utc::now();

        let mut ledger = Self::lock_ledger(&txn, ledger_id).await?;
        let entry = PartyLedgerService::add_payment_entry(
            &mut ledger,
            input.amount,
            &input.details,
            input.entry_date,
            now,
        )?;

        let voucher = if input.record_cash_movement {
            let voucher_input = Self::cash_movement(&txn, &ledger, input, accounts).await?;
            Some(VoucherRepository::create_voucher_in(&txn, &voucher_input).await?)
        } else {
            None
        };

        Self::append(&txn, &ledger, &entry, voucher.as_ref().map(|v| v.id.into_inner())).await?;

        let allocation = PaymentRepository::apply_payment_in(
            &txn,
            &PaymentInput {
                direction: ledger.kind.direction(),
                party_key: ledger.party_key().to_string(),
                party_name: ledger.party_name.clone(),
                amount: input.amount,
                details: input.details.clone(),
                source_reference: voucher
                    .as_ref()
                    .map(|v| v.voucher_number.clone())
                    .or_else(|| input.details.reference.clone()),
            },
            now,
        )
        .await?;

        txn.commit().await?;

        info!(
            ledger_id = %ledger_id,
            entry_id = %entry.id,
            party = %ledger.phone,
            amount = %input.amount,
            applied = %allocation.outcome.total_applied(),
            advance = %allocation.outcome.leftover,
            voucher = ?voucher.as_ref().map(|v| v.voucher_number.as_str()),
            "payment entry added"
        );

        Ok(PaymentEntryResult {
            ledger,
            entry,
            allocation,
            voucher,
        })
    }

    /// Builds the balanced Receipt (customer) or Payment (supplier) voucher
    /// for a payment. Bank payments use the bank account, everything else
    /// the cash account.
    async fn cash_movement<C>(
        conn: &C,
        ledger: &PartyLedger,
        input: &PaymentEntryInput,
        accounts: &AccountCodesConfig,
    ) -> Result<CreateVoucherInput, PartyLedgerRepoError>
    where
        C: ConnectionTrait,
    {
        let chart = AccountRepository::load_chart_in(conn).await?;
        let money_code = match input.details.method.as_deref() {
            Some(method) if method.trim().eq_ignore_ascii_case("bank") => &accounts.bank_code,
            _ => &accounts.cash_code,
        };
        let money = chart.find_by_code(money_code).map_err(AccountError::from)?.id;

        let (voucher_type, entries, verb) = match ledger.kind {
            PartyKind::Customer => {
                let receivable = chart
                    .find_by_code(&accounts.receivable_code)
                    .map_err(AccountError::from)?
                    .id;
                (
                    VoucherType::Receipt,
                    vec![
                        VoucherEntryInput::debit(money, input.amount),
                        VoucherEntryInput::credit(receivable, input.amount),
                    ],
                    "Received from",
                )
            }
            PartyKind::Supplier => {
                let payable = chart
                    .find_by_code(&accounts.payable_code)
                    .map_err(AccountError::from)?
                    .id;
                (
                    VoucherType::Payment,
                    vec![
                        VoucherEntryInput::debit(payable, input.amount),
                        VoucherEntryInput::credit(money, input.amount),
                    ],
                    "Paid to",
                )
            }
        };

        let narration = match input.details.reference.as_deref() {
            Some(reference) => format!("{verb} {} (ref {reference})", ledger.party_name),
            None => format!("{verb} {}", ledger.party_name),
        };

        Ok(CreateVoucherInput {
            date: input.entry_date,
            narration,
            voucher_type,
            entries,
        })
    }

    /// Posts a manual correction.
    ///
    /// # Errors
    ///
    /// Returns `BlankField` for an empty reason, plus the ledger errors of
    /// [`Self::add_invoice_entry`].
    pub async fn add_adjustment_entry(
        &self,
        ledger_id: PartyLedgerId,
        amount: Decimal,
        is_debit: bool,
        reason: &str,
        notes: Option<String>,
        entry_date: NaiveDate,
    ) -> Result<PartyLedgerEntry, PartyLedgerRepoError> {
        let txn = self.db.begin().await?;
        let mut ledger = Self::lock_ledger(&txn, ledger_id).await?;
        let entry = PartyLedgerService::add_adjustment_entry(
            &mut ledger,
            amount,
            is_debit,
            reason,
            notes,
            entry_date,
            Utc::now(),
        )?;
        Self::append(&txn, &ledger, &entry, None).await?;
        txn.commit().await?;

        info!(
            ledger_id = %ledger_id,
            entry_id = %entry.id,
            is_debit,
            amount = %amount,
            balance = %entry.balance_after,
            "adjustment entry added"
        );
        Ok(entry)
    }

    /// Lists a ledger's entries in posting order.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the ledger does not exist.
    pub async fn list_entries(
        &self,
        ledger_id: PartyLedgerId,
        dates: Option<DateRange>,
        page: &PageRequest,
    ) -> Result<PageResponse<PartyLedgerEntry>, PartyLedgerRepoError> {
        self.find_by_id(ledger_id).await?;

        let mut query = party_ledger_entries::Entity::find()
            .filter(party_ledger_entries::Column::LedgerId.eq(ledger_id.into_inner()));
        if let Some(range) = dates {
            query = query
                .filter(party_ledger_entries::Column::EntryDate.gte(range.start))
                .filter(party_ledger_entries::Column::EntryDate.lte(range.end));
        }

        let total = query.clone().count(&self.db).await?;
        let data = query
            .order_by_asc(party_ledger_entries::Column::CreatedAt)
            .order_by_asc(party_ledger_entries::Column::Id)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await?
            .into_iter()
            .map(party_entry_from_model)
            .collect();

        Ok(PageResponse::new(data, page.page, page.per_page, total))
    }

    /// Totals across all ledgers of one kind.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn dashboard(&self, kind: PartyKind) -> Result<PartyDashboard, PartyLedgerRepoError> {
        let ledgers: Vec<PartyLedger> = party_ledgers::Entity::find()
            .filter(party_ledgers::Column::Kind.eq(StoredPartyKind::from(kind)))
            .all(&self.db)
            .await?
            .into_iter()
            .map(party_ledger_from_model)
            .collect();
        Ok(PartyLedgerService::dashboard(&ledgers, kind))
    }

    // ========================================================================
    // Backfill
    // ========================================================================

    /// Opens ledgers and posts invoice entries for credit documents that
    /// predate ledger tracking.
    ///
    /// Safe to run repeatedly: a document whose reference already has an
    /// invoice entry is skipped. Each document commits on its own.
    ///
    /// # Errors
    ///
    /// Returns the first database error; documents processed before it stay
    /// committed.
    pub async fn create_ledgers_for_existing_credit_orders<D>(
        &self,
        documents: &[D],
    ) -> Result<BackfillReport, PartyLedgerRepoError>
    where
        D: TransactionFacts,
    {
        let mut report = BackfillReport::default();

        for document in documents {
            let Some(phone) = document.party_phone().filter(|p| !normalize_phone(p).is_empty())
            else {
                debug!(reference_id = %document.reference_id(), "skipping document without phone");
                report.skipped += 1;
                continue;
            };
            if !document.is_confirmed() || document.total_amount() <= Decimal::ZERO {
                report.skipped += 1;
                continue;
            }

            let txn = self.db.begin().await?;

            let already_posted = party_ledger_entries::Entity::find()
                .filter(party_ledger_entries::Column::EntryKind.eq(StoredEntryKind::Invoice))
                .filter(party_ledger_entries::Column::ReferenceType.eq(document.reference_type()))
                .filter(party_ledger_entries::Column::ReferenceId.eq(document.reference_id()))
                .count(&txn)
                .await?
                > 0;
            if already_posted {
                txn.rollback().await?;
                report.skipped += 1;
                continue;
            }

            let (ledger, created) = Self::find_or_create_in(
                &txn,
                NewPartyLedger {
                    kind: document.party_kind(),
                    party_name: document.party_name().to_string(),
                    phone: phone.to_string(),
                    email: None,
                    address: PartyAddress {
                        state: document.buyer_state().map(str::to_string),
                        ..PartyAddress::default()
                    },
                    opening_balance: Decimal::ZERO,
                },
            )
            .await?;

            let posted = match Self::add_invoice_entry_in(
                &txn,
                ledger.id,
                document,
                document.total_amount(),
            )
            .await
            {
                Ok((_, posted)) => posted,
                Err(PartyLedgerRepoError::PartyLedger(PartyLedgerError::Suspended(id))) => {
                    debug!(ledger_id = %id, "skipping document for suspended ledger");
                    txn.rollback().await?;
                    report.skipped += 1;
                    continue;
                }
                Err(e) => return Err(e),
            };
            txn.commit().await?;

            if created {
                report.ledgers_created += 1;
            }
            if posted {
                report.entries_created += 1;
            } else {
                report.skipped += 1;
            }
        }

        info!(
            ledgers_created = report.ledgers_created,
            entries_created = report.entries_created,
            skipped = report.skipped,
            "party ledger backfill finished"
        );
        Ok(report)
    }
}

