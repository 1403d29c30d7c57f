//! Allocation result types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use bahi_shared::types::{AdvanceCreditId, OutstandingId};

use crate::outstanding::{Direction, OutstandingStatus};

/// Amount applied to one outstanding item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Application {
    /// Item the payment went to.
    pub outstanding_id: OutstandingId,
    /// Amount applied.
    pub applied: Decimal,
    /// Amount still owed on the item afterwards.
    pub remaining: Decimal,
    /// Item status afterwards.
    pub new_status: OutstandingStatus,
}

/// Result of allocating one payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationOutcome {
    /// Payment amount before allocation.
    pub payment_amount: Decimal,
    /// Items touched, oldest first.
    pub applications: Vec<Application>,
    /// Amount not absorbed by any item.
    pub leftover: Decimal,
}

impl AllocationOutcome {
    /// Sum of all applied amounts.
    #[must_use]
    pub fn total_applied(&self) -> Decimal {
        self.applications.iter().map(|a| a.applied).sum()
    }

    /// Returns true if part of the payment became an advance.
    #[must_use]
    pub fn has_leftover(&self) -> bool {
        self.leftover > Decimal::ZERO
    }
}

/// Unapplied payment held for a party's future items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdvanceCredit {
    /// Advance ID.
    pub id: AdvanceCreditId,
    /// Side of the books the advance belongs to.
    pub direction: Direction,
    /// Party the advance belongs to.
    pub party_key: String,
    /// Party display name.
    pub party_name: String,
    /// Amount when recorded.
    pub original_amount: Decimal,
    /// Amount not yet drawn.
    pub remaining_amount: Decimal,
    /// Reference of the payment that produced it.
    pub source_reference: Option<String>,
    /// Creation timestamp; draw order.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl AdvanceCredit {
    /// Returns true once nothing is left to draw.
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.remaining_amount <= Decimal::ZERO
    }
}

/// Amount drawn from one advance into a new item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdvanceDraw {
    /// Advance drawn from.
    pub advance_id: AdvanceCreditId,
    /// Amount drawn.
    pub drawn: Decimal,
    /// Amount left on the advance.
    pub remaining: Decimal,
}
