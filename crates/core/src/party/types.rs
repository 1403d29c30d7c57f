//! Party ledger domain types.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use bahi_shared::types::{PartyLedgerEntryId, PartyLedgerId};

use crate::outstanding::Direction;

/// Counter-party side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PartyKind {
    /// Buys from us; balance is owed to us.
    Customer,
    /// Sells to us; balance is owed by us.
    Supplier,
}

impl PartyKind {
    /// Returns the string representation of the kind.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Customer => "CUSTOMER",
            Self::Supplier => "SUPPLIER",
        }
    }

    /// Outstanding direction this party's items sit on.
    #[must_use]
    pub fn direction(&self) -> Direction {
        match self {
            Self::Customer => Direction::Receivable,
            Self::Supplier => Direction::Payable,
        }
    }
}

impl fmt::Display for PartyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Ledger status.
///
/// The valid transitions are:
/// - Active ⇄ Inactive
/// - Active, Inactive → Suspended
/// - Suspended → Active
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PartyLedgerStatus {
    /// Normal operation.
    Active,
    /// Dormant; still accepts entries.
    Inactive,
    /// Frozen; accepts no entries.
    Suspended,
}

impl PartyLedgerStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "ACTIVE",
            Self::Inactive => "INACTIVE",
            Self::Suspended => "SUSPENDED",
        }
    }

    /// Returns true if the ledger may move to `to`.
    #[must_use]
    pub fn can_transition_to(&self, to: Self) -> bool {
        matches!(
            (self, to),
            (Self::Active, Self::Inactive | Self::Suspended)
                | (Self::Inactive, Self::Active | Self::Suspended)
                | (Self::Suspended, Self::Active)
        )
    }

    /// Returns true if entries may be appended.
    #[must_use]
    pub fn accepts_entries(&self) -> bool {
        !matches!(self, Self::Suspended)
    }
}

impl fmt::Display for PartyLedgerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// What produced a ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PartyEntryKind {
    /// Credit sale or purchase.
    Invoice,
    /// Money received or paid.
    Payment,
    /// Manual correction.
    Adjustment,
}

impl PartyEntryKind {
    /// Returns the string representation of the kind.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Invoice => "INVOICE",
            Self::Payment => "PAYMENT",
            Self::Adjustment => "ADJUSTMENT",
        }
    }
}

/// Postal address.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartyAddress {
    /// First line.
    pub line1: Option<String>,
    /// Second line.
    pub line2: Option<String>,
    /// City.
    pub city: Option<String>,
    /// State, used for the tax regime.
    pub state: Option<String>,
    /// PIN / postal code.
    pub postal_code: Option<String>,
}

/// Running-balance ledger for one counter-party.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartyLedger {
    /// Ledger ID.
    pub id: PartyLedgerId,
    /// Customer or supplier.
    pub kind: PartyKind,
    /// Display name.
    pub party_name: String,
    /// Normalized phone digits.
    pub phone: String,
    /// Email.
    pub email: Option<String>,
    /// Address.
    pub address: PartyAddress,
    /// Balance carried in when the ledger was opened.
    pub opening_balance: Decimal,
    /// Current balance; positive means the party owes (customer) or is owed
    /// (supplier).
    pub current_balance: Decimal,
    /// Sum of all debit entries.
    pub total_debits: Decimal,
    /// Sum of all credit entries.
    pub total_credits: Decimal,
    /// Ledger status.
    pub status: PartyLedgerStatus,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl PartyLedger {
    /// Returns true if the running totals agree with the balance.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        self.current_balance == self.opening_balance + self.total_debits - self.total_credits
    }

    /// Key shared with the party's outstanding items.
    #[must_use]
    pub fn party_key(&self) -> &str {
        &self.phone
    }
}

/// Input for opening a party ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPartyLedger {
    /// Customer or supplier.
    pub kind: PartyKind,
    /// Display name.
    pub party_name: String,
    /// Phone in any format.
    pub phone: String,
    /// Email.
    pub email: Option<String>,
    /// Address.
    pub address: PartyAddress,
    /// Opening balance.
    pub opening_balance: Decimal,
}

/// One append-only ledger line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartyLedgerEntry {
    /// Entry ID.
    pub id: PartyLedgerEntryId,
    /// Owning ledger.
    pub ledger_id: PartyLedgerId,
    /// What produced the entry.
    pub kind: PartyEntryKind,
    /// Business date.
    pub entry_date: NaiveDate,
    /// Debit amount.
    pub debit: Decimal,
    /// Credit amount.
    pub credit: Decimal,
    /// Ledger balance right after this entry.
    pub balance_after: Decimal,
    /// Source document kind.
    pub reference_type: Option<String>,
    /// Source document id.
    pub reference_id: Option<String>,
    /// Source document number.
    pub reference_number: Option<String>,
    /// Description.
    pub description: String,
    /// Payment method for payment entries.
    pub payment_method: Option<String>,
    /// Payment reference for payment entries.
    pub payment_reference: Option<String>,
    /// Free-form notes.
    pub notes: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Descriptive part of an entry, before amounts are applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryDraft {
    /// Entry kind.
    pub kind: PartyEntryKind,
    /// Business date.
    pub entry_date: NaiveDate,
    /// Description.
    pub description: String,
    /// Source document kind.
    pub reference_type: Option<String>,
    /// Source document id.
    pub reference_id: Option<String>,
    /// Source document number.
    pub reference_number: Option<String>,
    /// Payment method.
    pub payment_method: Option<String>,
    /// Payment reference.
    pub payment_reference: Option<String>,
    /// Notes.
    pub notes: Option<String>,
}

impl EntryDraft {
    /// Draft with only a kind, date and description.
    #[must_use]
    pub fn new(kind: PartyEntryKind, entry_date: NaiveDate, description: impl Into<String>) -> Self {
        Self {
            kind,
            entry_date,
            description: description.into(),
            reference_type: None,
            reference_id: None,
            reference_number: None,
            payment_method: None,
            payment_reference: None,
            notes: None,
        }
    }
}

/// Aggregate over one kind of party ledger.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartyDashboard {
    /// Sum of positive current balances.
    pub total_outstanding: Decimal,
    /// Number of parties with a positive balance.
    pub parties_with_balance: u64,
    /// Number of ledgers.
    pub total_parties: u64,
}

/// Reduces a phone number to its digits, dropping a leading `91` country
/// code from 12-digit numbers and a leading trunk `0` from 11-digit numbers.
#[must_use]
pub fn normalize_phone(raw: &str) -> String {
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    match digits.len() {
        12 if digits.starts_with("91") => digits[2..].to_string(),
        11 if digits.starts_with('0') => digits[1..].to_string(),
        _ => digits,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("9829012345", "9829012345")]
    #[case("+91 98290 12345", "9829012345")]
    #[case("098290-12345", "9829012345")]
    #[case("(0141) 2222-333", "1412222333")]
    #[case("n/a", "")]
    fn test_normalize_phone(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(normalize_phone(raw), expected);
    }

    #[test]
    fn test_status_transitions() {
        use PartyLedgerStatus::{Active, Inactive, Suspended};
        assert!(Active.can_transition_to(Inactive));
        assert!(Inactive.can_transition_to(Active));
        assert!(Active.can_transition_to(Suspended));
        assert!(Inactive.can_transition_to(Suspended));
        assert!(Suspended.can_transition_to(Active));
        assert!(!Suspended.can_transition_to(Inactive));
        assert!(!Active.can_transition_to(Active));
        assert!(!Suspended.accepts_entries());
        assert!(Inactive.accepts_entries());
    }
}
