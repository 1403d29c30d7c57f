//! Facts supplied by order finalization.
//!
//! Orders, purchase orders and their line items live outside this crate. The
//! bookkeeping core only needs the handful of facts exposed by
//! [`TransactionFacts`] to open outstanding items, write party ledger entries
//! and pick a tax regime.

use chrono::{DateTime, Days, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::outstanding::OutstandingType;
use crate::party::PartyKind;

/// Read-only view of a finalized commercial transaction.
pub trait TransactionFacts {
    /// Source document kind, e.g. `"order"`.
    fn reference_type(&self) -> &str;
    /// Source document id.
    fn reference_id(&self) -> &str;
    /// Human-readable document number.
    fn reference_number(&self) -> &str;
    /// Grand total including tax.
    fn total_amount(&self) -> Decimal;
    /// Counter-party name.
    fn party_name(&self) -> &str;
    /// Counter-party phone.
    fn party_phone(&self) -> Option<&str>;
    /// Buyer's state, for the tax regime.
    fn buyer_state(&self) -> Option<&str>;
    /// When the document was created.
    fn created_at(&self) -> DateTime<Utc>;
    /// Whether the document is confirmed and may open an outstanding item.
    fn is_confirmed(&self) -> bool;
    /// Outstanding type to open for this document.
    fn outstanding_type(&self) -> OutstandingType;
    /// Due date of the resulting outstanding item.
    fn due_date(&self) -> NaiveDate;

    /// Party ledger side this document posts to.
    fn party_kind(&self) -> PartyKind {
        match self.outstanding_type().direction() {
            crate::outstanding::Direction::Receivable => PartyKind::Customer,
            crate::outstanding::Direction::Payable => PartyKind::Supplier,
        }
    }
}

/// Kind of credit document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    /// Customer order sold on credit.
    SalesOrder,
    /// Purchase order bought on credit.
    PurchaseOrder,
}

impl DocumentKind {
    /// Returns the reference type stored on outstanding items.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SalesOrder => "order",
            Self::PurchaseOrder => "purchase_order",
        }
    }
}

/// Plain implementation of [`TransactionFacts`] for callers without their own
/// document type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreditDocument {
    /// Document kind.
    pub kind: DocumentKind,
    /// Document id.
    pub id: String,
    /// Document number.
    pub number: String,
    /// Grand total.
    pub total: Decimal,
    /// Counter-party name.
    pub party_name: String,
    /// Counter-party phone.
    pub party_phone: Option<String>,
    /// Buyer's state.
    pub party_state: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Confirmed flag.
    pub confirmed: bool,
    /// Days of credit granted from the creation date.
    pub credit_days: u32,
}

impl TransactionFacts for CreditDocument {
    fn reference_type(&self) -> &str {
        self.kind.as_str()
    }

    fn reference_id(&self) -> &str {
        &self.id
    }

    fn reference_number(&self) -> &str {
        &self.number
    }

    fn total_amount(&self) -> Decimal {
        self.total
    }

    fn party_name(&self) -> &str {
        &self.party_name
    }

    fn party_phone(&self) -> Option<&str> {
        self.party_phone.as_deref()
    }

    fn buyer_state(&self) -> Option<&str> {
        self.party_state.as_deref()
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn is_confirmed(&self) -> bool {
        self.confirmed
    }

    fn outstanding_type(&self) -> OutstandingType {
        match self.kind {
            DocumentKind::SalesOrder => OutstandingType::InvoiceReceivable,
            DocumentKind::PurchaseOrder => OutstandingType::PurchaseOrder,
        }
    }

    fn due_date(&self) -> NaiveDate {
        let created = self.created_at.date_naive();
        created
            .checked_add_days(Days::new(u64::from(self.credit_days)))
            .unwrap_or(created)
    }
}
