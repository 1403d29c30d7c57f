//! Outstanding repository for receivable and payable tracking.
//!
//! Rows carry a `version` column. Every write goes through [`save_in`], which
//! updates only when the stored version still matches the one that was read,
//! so the overdue sweep and payment allocation can run side by side without a
//! global lock.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::sea_query::{Expr, Func, LikeExpr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, DbBackend,
    DbErr, EntityTrait, FromQueryResult, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
    Set, Statement, TransactionTrait,
};
use tracing::{debug, info, warn};

use bahi_core::allocation::{AdvanceDraw, AllocationError, PaymentAllocator};
use bahi_core::documents::TransactionFacts;
use bahi_core::outstanding::{
    Direction, NewOutstanding, Outstanding, OutstandingError, OutstandingFilter,
    OutstandingService, OutstandingStatus, OutstandingSummary,
};
use bahi_shared::types::{AdvanceCreditId, OutstandingId, PageRequest, PageResponse};

use crate::entities::sea_orm_active_enums::{
    OutstandingDirection, OutstandingStatus as StoredStatus, OutstandingType as StoredType,
};
use crate::entities::{advance_credits, outstandings};
use crate::lock::{lock_key, lock_party};
use crate::mapping::{advance_from_model, outstanding_from_model, outstanding_to_active};

/// Error types for outstanding persistence.
#[derive(Debug, thiserror::Error)]
pub enum OutstandingRepoError {
    /// Lifecycle rule violated.
    #[error(transparent)]
    Outstanding(#[from] OutstandingError),

    /// Allocation rule violated.
    #[error(transparent)]
    Allocation(#[from] AllocationError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl OutstandingRepoError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Outstanding(e) => e.error_code(),
            Self::Allocation(e) => e.error_code(),
            Self::Database(_) => "DATABASE_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::Outstanding(e) => e.http_status_code(),
            Self::Allocation(e) => e.http_status_code(),
            Self::Database(_) => 500,
        }
    }

    /// Returns true if the caller may retry the operation unchanged.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Outstanding(e) => e.is_retryable(),
            Self::Allocation(e) => e.is_retryable(),
            Self::Database(_) => false,
        }
    }
}

impl From<OutstandingRepoError> for bahi_shared::AppError {
    fn from(err: OutstandingRepoError) -> Self {
        match err {
            OutstandingRepoError::Outstanding(e) => e.into(),
            OutstandingRepoError::Allocation(e) => e.into(),
            OutstandingRepoError::Database(e) => Self::Database(e.to_string()),
        }
    }
}

/// Result of creating an item for a source document.
#[derive(Debug, Clone)]
pub struct CreatedOutstanding {
    /// The stored item.
    pub item: Outstanding,
    /// False when the document already had an item and nothing was written.
    pub created: bool,
    /// Advance credits drawn into the new item.
    pub advance_draws: Vec<AdvanceDraw>,
}

/// Counters from one overdue sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Rows examined.
    pub scanned: u64,
    /// Rows whose overdue state changed.
    pub updated: u64,
    /// Rows skipped after exhausting optimistic retries.
    pub conflicts: u64,
}

#[derive(Debug, FromQueryResult)]
struct SummaryRow {
    direction: String,
    status: String,
    overdue: bool,
    item_count: i64,
    total: Decimal,
}

const SUMMARY_SQL: &str = r"
SELECT direction::text AS direction,
       status::text AS status,
       (days_overdue > 0) AS overdue,
       COUNT(*) AS item_count,
       COALESCE(SUM(amount), 0) AS total
FROM outstandings
GROUP BY 1, 2, 3
";

/// Writes a changed item back if nobody else has touched it since it was read.
///
/// Returns the item with its version bumped.
///
/// # Errors
///
/// Returns `ConcurrentModification` when the stored version moved on.
pub async fn save_in<C>(conn: &C, item: &Outstanding) -> Result<Outstanding, OutstandingRepoError>
where
    C: ConnectionTrait,
{
    let next_version = item.version + 1;
    let result = outstandings::Entity::update_many()
        .set(outstandings::ActiveModel {
            amount: Set(item.amount),
            days_overdue: Set(item.days_overdue),
            status: Set(item.status.into()),
            payment_method: Set(item.payment_method.clone()),
            payment_reference: Set(item.payment_reference.clone()),
            notes: Set(item.notes.clone()),
            updated_at: Set(item.updated_at.into()),
            version: Set(next_version),
            ..Default::default()
        })
        .filter(outstandings::Column::Id.eq(item.id.into_inner()))
        .filter(outstandings::Column::Version.eq(item.version))
        .exec(conn)
        .await?;

    if result.rows_affected == 0 {
        return Err(OutstandingError::ConcurrentModification(item.id).into());
    }

    let mut saved = item.clone();
    saved.version = next_version;
    Ok(saved)
}

/// Outstanding repository.
#[derive(Debug, Clone)]
pub struct OutstandingRepository {
    db: DatabaseConnection,
}

impl OutstandingRepository {
    /// Creates a new outstanding repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    // ========================================================================
    // Creation
    // ========================================================================

    /// Creates the item for a source document, or returns the existing one.
    ///
    /// A repeat call for the same reference returns the stored item untouched,
    /// whatever the rest of the input says. A new item immediately draws on
    /// the party's advance credits, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `InvalidAmount` or `BlankField` for bad input.
    pub async fn create_for_document(
        &self,
        input: NewOutstanding,
        today: NaiveDate,
    ) -> Result<CreatedOutstanding, OutstandingRepoError> {
        let txn = self.db.begin().await?;
        let created = Self::create_for_document_in(&txn, input, today, Utc::now()).await?;
        txn.commit().await?;

        if created.created {
            info!(
                outstanding_id = %created.item.id,
                reference = %created.item.reference_number,
                party = %created.item.party_key,
                amount = %created.item.amount,
                advances_drawn = created.advance_draws.len(),
                "outstanding created"
            );
        }
        Ok(created)
    }

    /// Creates the item on an open transaction.
    ///
    /// # Errors
    ///
    /// See [`Self::create_for_document`].
    pub async fn create_for_document_in<C>(
        conn: &C,
        input: NewOutstanding,
        today: NaiveDate,
        now: DateTime<Utc>,
    ) -> Result<CreatedOutstanding, OutstandingRepoError>
    where
        C: ConnectionTrait,
    {
        let reference_type = input.reference_type.trim();
        let reference_id = input.reference_id.trim();
        if !reference_type.is_empty() && !reference_id.is_empty() {
            lock_key(conn, &format!("outstanding_ref:{reference_type}:{reference_id}")).await?;
            if let Some(existing) =
                Self::find_by_reference_in(conn, reference_type, reference_id).await?
            {
                debug!(
                    outstanding_id = %existing.id,
                    reference_type = %existing.reference_type,
                    reference_id = %existing.reference_id,
                    "outstanding already exists for document"
                );
                return Ok(CreatedOutstanding {
                    item: existing,
                    created: false,
                    advance_draws: Vec::new(),
                });
            }
        }

        let mut item = OutstandingService::open(input, today, now)?;
        lock_party(conn, item.direction, &item.party_key).await?;

        let mut advances: Vec<_> = advance_credits::Entity::find()
            .filter(advance_credits::Column::Direction.eq(OutstandingDirection::from(item.direction)))
            .filter(advance_credits::Column::PartyKey.eq(item.party_key.as_str()))
            .filter(advance_credits::Column::RemainingAmount.gt(Decimal::ZERO))
            .order_by_asc(advance_credits::Column::CreatedAt)
            .order_by_asc(advance_credits::Column::Id)
            .all(conn)
            .await?
            .into_iter()
            .map(advance_from_model)
            .collect();

        let draws = PaymentAllocator::consume_advances(&mut item, &mut advances, now)?;

        outstanding_to_active(&item).insert(conn).await?;

        for draw in &draws {
            record_advance_draw(conn, draw.advance_id, draw.remaining, now).await?;
        }

        Ok(CreatedOutstanding {
            item,
            created: true,
            advance_draws: draws,
        })
    }

    /// Opens an item for a finalized transaction.
    ///
    /// Returns `None` for unconfirmed documents and non-positive totals.
    ///
    /// # Errors
    ///
    /// See [`Self::create_for_document`].
    pub async fn open_for_transaction(
        &self,
        facts: &impl TransactionFacts,
        today: NaiveDate,
    ) -> Result<Option<CreatedOutstanding>, OutstandingRepoError> {
        if !facts.is_confirmed() || facts.total_amount() <= Decimal::ZERO {
            debug!(
                reference_id = %facts.reference_id(),
                "document not eligible for an outstanding item"
            );
            return Ok(None);
        }
        self.create_for_document(OutstandingService::new_for_transaction(facts), today)
            .await
            .map(Some)
    }

    // ========================================================================
    // Lookups
    // ========================================================================

    /// Finds an item by id.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no such item exists.
    pub async fn find(&self, id: OutstandingId) -> Result<Outstanding, OutstandingRepoError> {
        Self::find_in(&self.db, id).await
    }

    async fn find_in<C>(conn: &C, id: OutstandingId) -> Result<Outstanding, OutstandingRepoError>
    where
        C: ConnectionTrait,
    {
        outstandings::Entity::find_by_id(id.into_inner())
            .one(conn)
            .await?
            .map(outstanding_from_model)
            .ok_or_else(|| OutstandingError::NotFound(id).into())
    }

    /// Finds the item for a source document.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_reference(
        &self,
        reference_type: &str,
        reference_id: &str,
    ) -> Result<Option<Outstanding>, OutstandingRepoError> {
        Self::find_by_reference_in(&self.db, reference_type, reference_id).await
    }

    async fn find_by_reference_in<C>(
        conn: &C,
        reference_type: &str,
        reference_id: &str,
    ) -> Result<Option<Outstanding>, OutstandingRepoError>
    where
        C: ConnectionTrait,
    {
        Ok(outstandings::Entity::find()
            .filter(outstandings::Column::ReferenceType.eq(reference_type.trim()))
            .filter(outstandings::Column::ReferenceId.eq(reference_id.trim()))
            .one(conn)
            .await?
            .map(outstanding_from_model))
    }

    /// Searches items, ordered by due date then creation time.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(
        &self,
        filter: &OutstandingFilter,
        page: &PageRequest,
    ) -> Result<PageResponse<Outstanding>, OutstandingRepoError> {
        let query = outstandings::Entity::find().filter(Self::condition(filter));
        let total = query.clone().count(&self.db).await?;

        let data = query
            .order_by_asc(outstandings::Column::DueDate)
            .order_by_asc(outstandings::Column::CreatedAt)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await?
            .into_iter()
            .map(outstanding_from_model)
            .collect();

        Ok(PageResponse::new(data, page.page, page.per_page, total))
    }

    fn condition(filter: &OutstandingFilter) -> Condition {
        let mut cond = Condition::all();
        if let Some(kind) = filter.outstanding_type {
            cond = cond.add(outstandings::Column::OutstandingType.eq(StoredType::from(kind)));
        }
        if let Some(status) = filter.status {
            cond = cond.add(outstandings::Column::Status.eq(StoredStatus::from(status)));
        }
        if let Some(direction) = filter.direction {
            cond = cond.add(outstandings::Column::Direction.eq(OutstandingDirection::from(direction)));
        }
        if let Some(key) = filter.party_key.as_deref() {
            cond = cond.add(outstandings::Column::PartyKey.eq(key));
        }
        if let Some(range) = filter.due {
            cond = cond
                .add(outstandings::Column::DueDate.gte(range.start))
                .add(outstandings::Column::DueDate.lte(range.end));
        }
        if let Some(min) = filter.min_amount {
            cond = cond.add(outstandings::Column::Amount.gte(min));
        }
        if let Some(max) = filter.max_amount {
            cond = cond.add(outstandings::Column::Amount.lte(max));
        }
        if filter.overdue_only {
            cond = cond
                .add(outstandings::Column::Status.is_not_in([StoredStatus::Settled, StoredStatus::Cancelled]))
                .add(outstandings::Column::DaysOverdue.gt(0));
        }
        if let Some(text) = filter.search_text() {
            let pattern = contains_pattern(&text);
            let mut any = Condition::any();
            for column in [
                outstandings::Column::PartyName,
                outstandings::Column::PartyContact,
                outstandings::Column::ReferenceNumber,
                outstandings::Column::Notes,
            ] {
                let like = LikeExpr::new(pattern.as_str()).escape('\\');
                any = any.add(Expr::expr(Func::lower(Expr::col(column))).like(like));
            }
            cond = cond.add(any);
        }
        cond
    }

    /// Totals and per-status counts across all items.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn summary(&self) -> Result<OutstandingSummary, OutstandingRepoError> {
        let rows = SummaryRow::find_by_statement(Statement::from_string(
            DbBackend::Postgres,
            SUMMARY_SQL,
        ))
        .all(&self.db)
        .await?;

        let mut summary = OutstandingSummary::default();
        for row in rows {
            let (Some(direction), Some(status)) = (
                Direction::parse(&row.direction),
                OutstandingStatus::parse(&row.status),
            ) else {
                continue;
            };
            *summary.status_counts.entry(status).or_insert(0) +=
                u64::try_from(row.item_count).unwrap_or(0);
            if status.is_terminal() {
                continue;
            }
            match direction {
                Direction::Receivable => {
                    summary.total_receivable += row.total;
                    if row.overdue {
                        summary.overdue_receivable += row.total;
                    }
                }
                Direction::Payable => {
                    summary.total_payable += row.total;
                    if row.overdue {
                        summary.overdue_payable += row.total;
                    }
                }
            }
        }
        Ok(summary)
    }

    /// Lists a party's unspent advance credits, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn advances_for(
        &self,
        direction: Direction,
        party_key: &str,
    ) -> Result<Vec<bahi_core::allocation::AdvanceCredit>, OutstandingRepoError> {
        Ok(advance_credits::Entity::find()
            .filter(advance_credits::Column::Direction.eq(OutstandingDirection::from(direction)))
            .filter(advance_credits::Column::PartyKey.eq(party_key))
            .filter(advance_credits::Column::RemainingAmount.gt(Decimal::ZERO))
            .order_by_asc(advance_credits::Column::CreatedAt)
            .order_by_asc(advance_credits::Column::Id)
            .all(&self.db)
            .await?
            .into_iter()
            .map(advance_from_model)
            .collect())
    }

    // ========================================================================
    // Status changes
    // ========================================================================

    /// Subtracts a payment; settles and clamps at zero when nothing remains.
    ///
    /// # Errors
    ///
    /// Returns `NotFound`, `InvalidAmount` or `InvalidStatusTransition`.
    pub async fn mark_partially_paid(
        &self,
        id: OutstandingId,
        paid: Decimal,
        notes: Option<String>,
    ) -> Result<Outstanding, OutstandingRepoError> {
        self.apply(id, "partially paid", |item, now| {
            OutstandingService::mark_partially_paid(item, paid, notes, now)
        })
        .await
    }

    /// Settles an item outright.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` or `InvalidStatusTransition` for cancelled items.
    pub async fn mark_settled(
        &self,
        id: OutstandingId,
        notes: Option<String>,
    ) -> Result<Outstanding, OutstandingRepoError> {
        self.apply(id, "settled", |item, now| {
            OutstandingService::mark_settled(item, notes, now)
        })
        .await
    }

    /// Applies an explicit settlement amount.
    ///
    /// # Errors
    ///
    /// Returns `InsufficientOutstanding` when `amount` exceeds what remains.
    pub async fn settle_with_amount(
        &self,
        id: OutstandingId,
        amount: Decimal,
        notes: Option<String>,
    ) -> Result<Outstanding, OutstandingRepoError> {
        self.apply(id, "settled with amount", |item, now| {
            OutstandingService::settle_with_amount(item, amount, notes, now)
        })
        .await
    }

    /// Puts an item under dispute.
    ///
    /// # Errors
    ///
    /// Returns `InvalidStatusTransition` for terminal items.
    pub async fn dispute(
        &self,
        id: OutstandingId,
        notes: Option<String>,
    ) -> Result<Outstanding, OutstandingRepoError> {
        self.apply(id, "disputed", |item, now| {
            OutstandingService::dispute(item, notes, now)
        })
        .await
    }

    /// Lifts a dispute.
    ///
    /// # Errors
    ///
    /// Returns `InvalidStatusTransition` when the item is not disputed.
    pub async fn resolve_dispute(
        &self,
        id: OutstandingId,
        notes: Option<String>,
        today: NaiveDate,
    ) -> Result<Outstanding, OutstandingRepoError> {
        self.apply(id, "dispute resolved", |item, now| {
            OutstandingService::resolve_dispute(item, notes, today, now)
        })
        .await
    }

    /// Cancels an item.
    ///
    /// # Errors
    ///
    /// Returns `InvalidStatusTransition` for terminal items.
    pub async fn cancel(
        &self,
        id: OutstandingId,
        notes: Option<String>,
    ) -> Result<Outstanding, OutstandingRepoError> {
        self.apply(id, "cancelled", |item, now| {
            OutstandingService::cancel(item, notes, now)
        })
        .await
    }

    /// Moves an item to `to` if the lifecycle allows it.
    ///
    /// # Errors
    ///
    /// Returns `InvalidStatusTransition` otherwise.
    pub async fn update_status(
        &self,
        id: OutstandingId,
        to: OutstandingStatus,
        notes: Option<String>,
    ) -> Result<Outstanding, OutstandingRepoError> {
        self.apply(id, to.as_str(), |item, now| {
            OutstandingService::transition(item, to, notes, now)
        })
        .await
    }

    /// Recomputes one item's overdue state.
    ///
    /// Returns true when the stored row changed.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` or `ConcurrentModification`.
    pub async fn update_days_overdue(
        &self,
        id: OutstandingId,
        today: NaiveDate,
    ) -> Result<bool, OutstandingRepoError> {
        let mut item = self.find(id).await?;
        if !OutstandingService::update_days_overdue(&mut item, today, Utc::now()) {
            return Ok(false);
        }
        save_in(&self.db, &item).await?;
        Ok(true)
    }

    async fn apply<F>(
        &self,
        id: OutstandingId,
        action: &str,
        op: F,
    ) -> Result<Outstanding, OutstandingRepoError>
    where
        F: FnOnce(&mut Outstanding, DateTime<Utc>) -> Result<(), OutstandingError>,
    {
        let mut item = self.find(id).await?;
        op(&mut item, Utc::now())?;
        let saved = save_in(&self.db, &item).await?;

        info!(
            outstanding_id = %saved.id,
            action,
            status = %saved.status,
            remaining = %saved.amount,
            "outstanding updated"
        );
        Ok(saved)
    }

    // ========================================================================
    // Overdue sweep
    // ========================================================================

    /// Recomputes overdue state for every non-settled item.
    ///
    /// Rows are visited in id order, `batch_size` at a time. Each row is
    /// written with an optimistic version check; on conflict it is reloaded
    /// and retried up to `max_retries` times, then counted as a conflict and
    /// left for the next sweep.
    ///
    /// # Errors
    ///
    /// Returns an error if a database query fails.
    pub async fn sweep_overdue(
        &self,
        today: NaiveDate,
        batch_size: u64,
        max_retries: u32,
    ) -> Result<SweepReport, OutstandingRepoError> {
        let mut report = SweepReport::default();
        let mut cursor: Option<uuid::Uuid> = None;

        loop {
            let mut query = outstandings::Entity::find()
                .filter(outstandings::Column::Status.ne(StoredStatus::Settled));
            if let Some(last) = cursor {
                query = query.filter(outstandings::Column::Id.gt(last));
            }
            let batch = query
                .order_by_asc(outstandings::Column::Id)
                .limit(batch_size.max(1))
                .all(&self.db)
                .await?;

            let Some(last) = batch.last().map(|m| m.id) else {
                break;
            };
            cursor = Some(last);

            for model in batch {
                report.scanned += 1;
                match self.sweep_one(outstanding_from_model(model), today, max_retries).await? {
                    SweepOutcome::Updated => report.updated += 1,
                    SweepOutcome::Unchanged => {}
                    SweepOutcome::Conflict => report.conflicts += 1,
                }
            }
        }

        info!(
            scanned = report.scanned,
            updated = report.updated,
            conflicts = report.conflicts,
            %today,
            "overdue sweep finished"
        );
        Ok(report)
    }

    async fn sweep_one(
        &self,
        mut item: Outstanding,
        today: NaiveDate,
        max_retries: u32,
    ) -> Result<SweepOutcome, OutstandingRepoError> {
        let mut attempt = 0;
        loop {
            if !OutstandingService::update_days_overdue(&mut item, today, Utc::now()) {
                return Ok(SweepOutcome::Unchanged);
            }
            match save_in(&self.db, &item).await {
                Ok(_) => return Ok(SweepOutcome::Updated),
                Err(OutstandingRepoError::Outstanding(OutstandingError::ConcurrentModification(
                    id,
                ))) => {
                    if attempt >= max_retries {
                        warn!(outstanding_id = %id, attempts = attempt + 1, "giving up on overdue update");
                        return Ok(SweepOutcome::Conflict);
                    }
                    attempt += 1;
                    warn!(outstanding_id = %id, attempt, "overdue update conflicted, retrying");
                    match Self::find_in(&self.db, id).await {
                        Ok(fresh) => item = fresh,
                        Err(OutstandingRepoError::Outstanding(OutstandingError::NotFound(_))) => {
                            return Ok(SweepOutcome::Unchanged);
                        }
                        Err(e) => return Err(e),
                    }
                }
                Err(e) => return Err(e),
            }
        }
    }
}

enum SweepOutcome {
    Updated,
    Unchanged,
    Conflict,
}

async fn record_advance_draw<C>(
    conn: &C,
    advance_id: AdvanceCreditId,
    remaining: Decimal,
    now: DateTime<Utc>,
) -> Result<(), DbErr>
where
    C: ConnectionTrait,
{
    advance_credits::ActiveModel {
        id: Set(advance_id.into_inner()),
        remaining_amount: Set(remaining),
        updated_at: Set(now.into()),
        ..Default::default()
    }
    .update(conn)
    .await?;
    Ok(())
}

/// `%text%` with LIKE wildcards in `text` matched literally.
fn contains_pattern(text: &str) -> String {
    let mut pattern = String::with_capacity(text.len() + 2);
    pattern.push('%');
    for ch in text.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}
