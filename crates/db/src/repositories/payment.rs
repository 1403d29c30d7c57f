//! Payment repository: applies a party's payment across its open items.
//!
//! The allocation itself is [`PaymentAllocator::allocate`]; this module loads
//! the party's open items under the party lock, writes back every item the
//! payment touched and stores any leftover as an advance credit.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, TransactionTrait,
};
use tracing::{debug, info};

use bahi_core::allocation::{AdvanceCredit, AllocationOutcome, PaymentAllocator};
use bahi_core::outstanding::{Direction, Outstanding, OutstandingStatus, PaymentDetails};

use crate::entities::outstandings;
use crate::entities::sea_orm_active_enums::{
    OutstandingDirection, OutstandingStatus as StoredStatus,
};
use crate::lock::lock_party;
use crate::mapping::{advance_to_active, outstanding_from_model};
use crate::repositories::outstanding::{OutstandingRepoError, save_in};

/// A payment to apply.
#[derive(Debug, Clone)]
pub struct PaymentInput {
    /// Side of the books the payment settles.
    pub direction: Direction,
    /// Party identity, see [`bahi_core::outstanding::party_key`].
    pub party_key: String,
    /// Party display name, copied onto any advance credit.
    pub party_name: String,
    /// Amount paid.
    pub amount: Decimal,
    /// Method, reference and notes recorded on each touched item.
    pub details: PaymentDetails,
    /// Reference stored on the advance credit, e.g. a receipt number.
    pub source_reference: Option<String>,
}

/// What a payment did.
#[derive(Debug, Clone)]
pub struct PaymentResult {
    /// Per-item applications and the leftover.
    pub outcome: AllocationOutcome,
    /// Items after the payment, in allocation order.
    pub items: Vec<Outstanding>,
    /// Advance credit created from the leftover.
    pub advance: Option<AdvanceCredit>,
}

/// Payment repository.
#[derive(Debug, Clone)]
pub struct PaymentRepository {
    db: DatabaseConnection,
}

impl PaymentRepository {
    /// Creates a new payment repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Applies a payment oldest item first and keeps the rest as an advance.
    ///
    /// # Errors
    ///
    /// Returns `InvalidPaymentAmount` for non-positive or over-precise
    /// amounts and `BlankParty` for an empty party key.
    pub async fn apply_payment(
        &self,
        input: &PaymentInput,
    ) -> Result<PaymentResult, OutstandingRepoError> {
        let txn = self.db.begin().await?;
        let result = Self::apply_payment_in(&txn, input, Utc::now()).await?;
        txn.commit().await?;

        info!(
            party = %input.party_key,
            direction = %input.direction,
            amount = %input.amount,
            items = result.outcome.applications.len(),
            leftover = %result.outcome.leftover,
            "payment applied"
        );
        Ok(result)
    }

    /// Applies a payment on an open transaction.
    ///
    /// # Errors
    ///
    /// See [`Self::apply_payment`].
    pub async fn apply_payment_in<C>(
        conn: &C,
        input: &PaymentInput,
        now: DateTime<Utc>,
    ) -> Result<PaymentResult, OutstandingRepoError>
    where
        C: ConnectionTrait,
    {
        lock_party(conn, input.direction, &input.party_key).await?;

        let open: Vec<StoredStatus> = OutstandingStatus::OPEN_FOR_PAYMENT
            .into_iter()
            .map(StoredStatus::from)
            .collect();

        let mut items: Vec<Outstanding> = outstandings::Entity::find()
            .filter(outstandings::Column::Direction.eq(OutstandingDirection::from(input.direction)))
            .filter(outstandings::Column::PartyKey.eq(input.party_key.as_str()))
            .filter(outstandings::Column::Status.is_in(open))
            .filter(outstandings::Column::Amount.gt(Decimal::ZERO))
            .order_by_asc(outstandings::Column::CreatedAt)
            .order_by_asc(outstandings::Column::Id)
            .lock_exclusive()
            .all(conn)
            .await?
            .into_iter()
            .map(outstanding_from_model)
            .collect();

        debug!(party = %input.party_key, open_items = items.len(), "allocating payment");

        let outcome = PaymentAllocator::allocate(
            &mut items,
            &input.party_key,
            input.direction,
            input.amount,
            &input.details,
            now,
        )?;

        let mut touched = Vec::with_capacity(outcome.applications.len());
        for application in &outcome.applications {
            if let Some(item) = items.iter().find(|i| i.id == application.outstanding_id) {
                touched.push(save_in(conn, item).await?);
            }
        }

        let advance = PaymentAllocator::advance_from(
            &outcome,
            input.direction,
            &input.party_key,
            &input.party_name,
            input.source_reference.clone(),
            now,
        );
        if let Some(advance) = &advance {
            advance_to_active(advance).insert(conn).await?;
            debug!(
                advance_id = %advance.id,
                party = %advance.party_key,
                amount = %advance.remaining_amount,
                "advance credit recorded"
            );
        }

        Ok(PaymentResult {
            outcome,
            items: touched,
            advance,
        })
    }
}
