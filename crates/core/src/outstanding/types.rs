//! Outstanding domain types.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use bahi_shared::types::OutstandingId;

use crate::party::normalize_phone;

/// What kind of obligation an item represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OutstandingType {
    /// A customer owes us for an invoice.
    InvoiceReceivable,
    /// We owe a supplier for an invoice.
    InvoicePayable,
    /// We owe a supplier for a purchase order.
    PurchaseOrder,
    /// A customer owes us an agreed advance.
    AdvancePayment,
    /// We owe an expense.
    Expense,
    /// We owe a loan repayment.
    Loan,
    /// Any other payable.
    Other,
}

impl OutstandingType {
    /// All variants.
    pub const ALL: [Self; 7] = [
        Self::InvoiceReceivable,
        Self::InvoicePayable,
        Self::PurchaseOrder,
        Self::AdvancePayment,
        Self::Expense,
        Self::Loan,
        Self::Other,
    ];

    /// Returns the string representation of the type.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvoiceReceivable => "INVOICE_RECEIVABLE",
            Self::InvoicePayable => "INVOICE_PAYABLE",
            Self::PurchaseOrder => "PURCHASE_ORDER",
            Self::AdvancePayment => "ADVANCE_PAYMENT",
            Self::Expense => "EXPENSE",
            Self::Loan => "LOAN",
            Self::Other => "OTHER",
        }
    }

    /// Parses a type from a string.
    pub fn parse(s: &str) -> Option<Self> {
        let upper = s.trim().to_uppercase();
        Self::ALL.into_iter().find(|t| t.as_str() == upper)
    }

    /// Whether money flows in or out when this item is paid.
    #[must_use]
    pub fn direction(&self) -> Direction {
        match self {
            Self::InvoiceReceivable | Self::AdvancePayment => Direction::Receivable,
            Self::InvoicePayable
            | Self::PurchaseOrder
            | Self::Expense
            | Self::Loan
            | Self::Other => Direction::Payable,
        }
    }
}

impl fmt::Display for OutstandingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Which side of the books an item sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Direction {
    /// Owed to the business (customer side).
    Receivable,
    /// Owed by the business (supplier side).
    Payable,
}

impl Direction {
    /// Returns the string representation of the direction.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Receivable => "RECEIVABLE",
            Self::Payable => "PAYABLE",
        }
    }

    /// Parses a direction from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "RECEIVABLE" => Some(Self::Receivable),
            "PAYABLE" => Some(Self::Payable),
            _ => None,
        }
    }

    /// Key that serializes allocation for one party on one side.
    #[must_use]
    pub fn lock_key(&self, party_key: &str) -> String {
        format!("{}:{party_key}", self.as_str())
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Lifecycle status of an outstanding item.
///
/// The valid transitions are:
/// - Pending → Overdue, PartiallyPaid, Settled, Disputed, Cancelled
/// - Overdue → PartiallyPaid, Settled, Disputed, Cancelled
/// - PartiallyPaid → PartiallyPaid, Settled, Disputed, Cancelled
/// - Disputed → Pending, Overdue, PartiallyPaid, Settled, Cancelled
/// - Settled, Cancelled → nothing
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OutstandingStatus {
    /// Not yet due.
    Pending,
    /// Past its due date with nothing paid.
    Overdue,
    /// Some but not all of the amount paid.
    PartiallyPaid,
    /// Fully paid.
    Settled,
    /// Under dispute, payments paused.
    Disputed,
    /// Written off or voided.
    Cancelled,
}

impl OutstandingStatus {
    /// All variants.
    pub const ALL: [Self; 6] = [
        Self::Pending,
        Self::Overdue,
        Self::PartiallyPaid,
        Self::Settled,
        Self::Disputed,
        Self::Cancelled,
    ];

    /// Statuses eligible for payment allocation.
    pub const OPEN_FOR_PAYMENT: [Self; 3] = [Self::Pending, Self::Overdue, Self::PartiallyPaid];

    /// Returns the string representation of the status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Overdue => "OVERDUE",
            Self::PartiallyPaid => "PARTIALLY_PAID",
            Self::Settled => "SETTLED",
            Self::Disputed => "DISPUTED",
            Self::Cancelled => "CANCELLED",
        }
    }

    /// Parses a status from a string.
    pub fn parse(s: &str) -> Option<Self> {
        let upper = s.trim().to_uppercase();
        Self::ALL.into_iter().find(|st| st.as_str() == upper)
    }

    /// Returns true if no further transition is allowed.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Settled | Self::Cancelled)
    }

    /// Returns true if payments may be allocated to the item.
    #[must_use]
    pub fn is_open_for_payment(&self) -> bool {
        Self::OPEN_FOR_PAYMENT.contains(self)
    }

    /// Returns true if the lifecycle allows moving to `to`.
    #[must_use]
    pub fn can_transition_to(&self, to: Self) -> bool {
        use OutstandingStatus::{Cancelled, Disputed, Overdue, PartiallyPaid, Pending, Settled};
        match (self, to) {
            (Pending, Overdue | PartiallyPaid | Settled | Disputed | Cancelled)
            | (Overdue | PartiallyPaid, PartiallyPaid | Settled | Disputed | Cancelled)
            | (Disputed, Pending | Overdue | PartiallyPaid | Settled | Cancelled) => true,
            _ => false,
        }
    }
}

impl fmt::Display for OutstandingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An amount owed to or by the business, tied to one source document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outstanding {
    /// Item ID.
    pub id: OutstandingId,
    /// Obligation kind.
    pub outstanding_type: OutstandingType,
    /// Derived from the type.
    pub direction: Direction,
    /// Source document kind (e.g. "order", "purchase_order").
    pub reference_type: String,
    /// Source document id.
    pub reference_id: String,
    /// Human-readable source number.
    pub reference_number: String,
    /// Amount when the item was opened.
    pub original_amount: Decimal,
    /// Amount still owed.
    pub amount: Decimal,
    /// Due date.
    pub due_date: NaiveDate,
    /// Days past the due date, 0 when not yet due.
    pub days_overdue: i64,
    /// Lifecycle status.
    pub status: OutstandingStatus,
    /// Counter-party display name.
    pub party_name: String,
    /// Counter-party phone or email.
    pub party_contact: Option<String>,
    /// Normalized key grouping items of the same party.
    pub party_key: String,
    /// Method of the last payment.
    pub payment_method: Option<String>,
    /// Reference of the last payment.
    pub payment_reference: Option<String>,
    /// Free-form notes.
    pub notes: Option<String>,
    /// Creation timestamp; allocation order.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
    /// Optimistic concurrency version.
    pub version: i64,
}

impl Outstanding {
    /// Amount paid so far.
    #[must_use]
    pub fn paid_amount(&self) -> Decimal {
        self.original_amount - self.amount
    }
}

/// Input for opening an outstanding item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewOutstanding {
    /// Obligation kind.
    pub outstanding_type: OutstandingType,
    /// Source document kind.
    pub reference_type: String,
    /// Source document id.
    pub reference_id: String,
    /// Human-readable source number.
    pub reference_number: String,
    /// Amount owed.
    pub amount: Decimal,
    /// Due date.
    pub due_date: NaiveDate,
    /// Counter-party display name.
    pub party_name: String,
    /// Counter-party phone or email.
    pub party_contact: Option<String>,
    /// Free-form notes.
    pub notes: Option<String>,
}

/// Payment metadata recorded on items a payment touches.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentDetails {
    /// Payment method (cash, bank, upi, ...).
    pub method: Option<String>,
    /// External reference such as a cheque or UTR number.
    pub reference: Option<String>,
    /// Free-form notes.
    pub notes: Option<String>,
}

impl PaymentDetails {
    /// Details carrying only a method.
    #[must_use]
    pub fn method(method: impl Into<String>) -> Self {
        Self {
            method: Some(method.into()),
            ..Self::default()
        }
    }

    /// Details carrying only notes.
    #[must_use]
    pub fn notes(notes: Option<String>) -> Self {
        Self {
            notes,
            ..Self::default()
        }
    }
}

/// Key grouping a party's items: digits of the phone when present, otherwise
/// the trimmed lowercase name.
#[must_use]
pub fn party_key(party_name: &str, contact: Option<&str>) -> String {
    contact
        .map(normalize_phone)
        .filter(|digits| !digits.is_empty())
        .unwrap_or_else(|| party_name.trim().to_lowercase())
}
