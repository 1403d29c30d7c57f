//! Outstanding lifecycle operations.
//!
//! All functions mutate an in-memory [`Outstanding`] and leave persistence
//! (including the optimistic `version` bump) to the caller.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;

use bahi_shared::types::{OutstandingId, is_currency_scale};

use super::error::OutstandingError;
use super::types::{NewOutstanding, Outstanding, OutstandingStatus, PaymentDetails, party_key};
use crate::documents::TransactionFacts;

/// Service for outstanding item state changes.
pub struct OutstandingService;

impl OutstandingService {
    /// Opens a new PENDING item and computes its initial overdue state.
    pub fn open(
        input: NewOutstanding,
        today: NaiveDate,
        now: DateTime<Utc>,
    ) -> Result<Outstanding, OutstandingError> {
        Self::check_amount(input.amount)?;
        if input.reference_type.trim().is_empty() {
            return Err(OutstandingError::BlankField("reference_type"));
        }
        if input.reference_id.trim().is_empty() {
            return Err(OutstandingError::BlankField("reference_id"));
        }
        if input.party_name.trim().is_empty() {
            return Err(OutstandingError::BlankField("party_name"));
        }

        let key = party_key(&input.party_name, input.party_contact.as_deref());
        let mut item = Outstanding {
            id: OutstandingId::new(),
            direction: input.outstanding_type.direction(),
            outstanding_type: input.outstanding_type,
            reference_type: input.reference_type.trim().to_string(),
            reference_id: input.reference_id.trim().to_string(),
            reference_number: input.reference_number,
            original_amount: input.amount,
            amount: input.amount,
            due_date: input.due_date,
            days_overdue: 0,
            status: OutstandingStatus::Pending,
            party_name: input.party_name.trim().to_string(),
            party_contact: input.party_contact,
            party_key: key,
            payment_method: None,
            payment_reference: None,
            notes: input.notes,
            created_at: now,
            updated_at: now,
            version: 0,
        };
        Self::update_days_overdue(&mut item, today, now);
        Ok(item)
    }

    /// Opens an item for a finalized transaction.
    ///
    /// Returns `None` for unconfirmed documents and non-positive totals.
    pub fn open_for_transaction(
        facts: &impl TransactionFacts,
        today: NaiveDate,
        now: DateTime<Utc>,
    ) -> Result<Option<Outstanding>, OutstandingError> {
        if !facts.is_confirmed() || facts.total_amount() <= Decimal::ZERO {
            return Ok(None);
        }
        Self::open(Self::new_for_transaction(facts), today, now).map(Some)
    }

    /// Builds the open request for a transaction without validating it.
    #[must_use]
    pub fn new_for_transaction(facts: &impl TransactionFacts) -> NewOutstanding {
        NewOutstanding {
            outstanding_type: facts.outstanding_type(),
            reference_type: facts.reference_type().to_string(),
            reference_id: facts.reference_id().to_string(),
            reference_number: facts.reference_number().to_string(),
            amount: facts.total_amount(),
            due_date: facts.due_date(),
            party_name: facts.party_name().to_string(),
            party_contact: facts.party_phone().map(str::to_string),
            notes: None,
        }
    }

    /// Recomputes `days_overdue` and promotes PENDING to OVERDUE once the
    /// due date has passed.
    ///
    /// Settled items are left untouched. Returns true if anything changed, so
    /// a second call with the same `today` always returns false.
    pub fn update_days_overdue(
        item: &mut Outstanding,
        today: NaiveDate,
        now: DateTime<Utc>,
    ) -> bool {
        if item.status == OutstandingStatus::Settled {
            return false;
        }

        let days = if today > item.due_date {
            (today - item.due_date).num_days()
        } else {
            0
        };
        let promote = days > 0 && item.status == OutstandingStatus::Pending;

        if days == item.days_overdue && !promote {
            return false;
        }

        item.days_overdue = days;
        if promote {
            item.status = OutstandingStatus::Overdue;
        }
        item.updated_at = now;
        true
    }

    /// Reduces the remaining amount by `paid`.
    ///
    /// The item becomes PARTIALLY_PAID, or SETTLED with the amount clamped to
    /// zero once nothing remains.
    pub fn mark_partially_paid(
        item: &mut Outstanding,
        paid: Decimal,
        notes: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<(), OutstandingError> {
        Self::record_payment(item, paid, &PaymentDetails::notes(notes), now)
    }

    /// Records a payment against the item along with its metadata.
    pub fn record_payment(
        item: &mut Outstanding,
        paid: Decimal,
        details: &PaymentDetails,
        now: DateTime<Utc>,
    ) -> Result<(), OutstandingError> {
        Self::check_amount(paid)?;

        let remaining = item.amount - paid;
        let next = if remaining <= Decimal::ZERO {
            OutstandingStatus::Settled
        } else {
            OutstandingStatus::PartiallyPaid
        };
        Self::check_transition(item, next)?;

        item.amount = remaining.max(Decimal::ZERO);
        item.status = next;
        if details.method.is_some() {
            item.payment_method.clone_from(&details.method);
        }
        if details.reference.is_some() {
            item.payment_reference.clone_from(&details.reference);
        }
        Self::append_notes(item, details.notes.as_deref());
        item.updated_at = now;
        Ok(())
    }

    /// Settles the item outright, zeroing the amount.
    ///
    /// Settling an already settled item is a no-op. Cancelled items cannot be
    /// settled.
    pub fn mark_settled(
        item: &mut Outstanding,
        notes: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<(), OutstandingError> {
        if item.status == OutstandingStatus::Settled {
            return Ok(());
        }
        Self::check_transition(item, OutstandingStatus::Settled)?;

        item.amount = Decimal::ZERO;
        item.status = OutstandingStatus::Settled;
        Self::append_notes(item, notes.as_deref());
        item.updated_at = now;
        Ok(())
    }

    /// Applies an explicit settlement amount, rejecting anything above the
    /// remaining amount.
    pub fn settle_with_amount(
        item: &mut Outstanding,
        amount: Decimal,
        notes: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<(), OutstandingError> {
        Self::check_amount(amount)?;
        if amount > item.amount {
            return Err(OutstandingError::InsufficientOutstanding {
                requested: amount,
                remaining: item.amount,
            });
        }
        Self::mark_partially_paid(item, amount, notes, now)
    }

    /// Puts the item under dispute.
    pub fn dispute(
        item: &mut Outstanding,
        notes: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<(), OutstandingError> {
        Self::transition(item, OutstandingStatus::Disputed, notes, now)
    }

    /// Lifts a dispute.
    ///
    /// The item returns to PARTIALLY_PAID if anything was paid, otherwise to
    /// OVERDUE or PENDING depending on its due date.
    pub fn resolve_dispute(
        item: &mut Outstanding,
        notes: Option<String>,
        today: NaiveDate,
        now: DateTime<Utc>,
    ) -> Result<(), OutstandingError> {
        if item.status != OutstandingStatus::Disputed {
            return Err(OutstandingError::InvalidStatusTransition {
                from: item.status,
                to: OutstandingStatus::Pending,
            });
        }

        let target = if item.amount < item.original_amount {
            OutstandingStatus::PartiallyPaid
        } else if today > item.due_date {
            OutstandingStatus::Overdue
        } else {
            OutstandingStatus::Pending
        };
        Self::transition(item, target, notes, now)?;
        Self::update_days_overdue(item, today, now);
        Ok(())
    }

    /// Cancels the item. The remaining amount is kept for the record.
    pub fn cancel(
        item: &mut Outstanding,
        notes: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<(), OutstandingError> {
        Self::transition(item, OutstandingStatus::Cancelled, notes, now)
    }

    /// Moves to `to` if the lifecycle allows it.
    pub fn transition(
        item: &mut Outstanding,
        to: OutstandingStatus,
        notes: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<(), OutstandingError> {
        Self::check_transition(item, to)?;
        item.status = to;
        if to == OutstandingStatus::Settled {
            item.amount = Decimal::ZERO;
        }
        Self::append_notes(item, notes.as_deref());
        item.updated_at = now;
        Ok(())
    }

    fn check_transition(item: &Outstanding, to: OutstandingStatus) -> Result<(), OutstandingError> {
        if item.status.can_transition_to(to) {
            Ok(())
        } else {
            Err(OutstandingError::InvalidStatusTransition {
                from: item.status,
                to,
            })
        }
    }

    fn check_amount(amount: Decimal) -> Result<(), OutstandingError> {
        if amount <= Decimal::ZERO || !is_currency_scale(amount) {
            return Err(OutstandingError::InvalidAmount(amount));
        }
        Ok(())
    }

    fn append_notes(item: &mut Outstanding, notes: Option<&str>) {
        let Some(notes) = notes.map(str::trim).filter(|n| !n.is_empty()) else {
            return;
        };
        item.notes = Some(match item.notes.take() {
            Some(existing) if !existing.is_empty() => format!("{existing}\n{notes}"),
            _ => notes.to_string(),
        });
    }
}
