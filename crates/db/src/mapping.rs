//! Conversions between stored models and `bahi-core` domain types.

use chrono::Utc;
use sea_orm::Set;

use bahi_core::allocation::AdvanceCredit;
use bahi_core::ledger::{self, Account};
use bahi_core::outstanding::{self, Direction, Outstanding};
use bahi_core::party::{self, PartyAddress, PartyLedger, PartyLedgerEntry};
use bahi_shared::types::{
    AccountId, AdvanceCreditId, OutstandingId, PartyLedgerEntryId, PartyLedgerId,
};

use crate::entities::{
    accounts, advance_credits, outstandings, party_ledger_entries, party_ledgers,
    sea_orm_active_enums::{
        AccountType, OutstandingDirection, OutstandingStatus, OutstandingType, PartyEntryKind,
        PartyKind, PartyLedgerStatus, VoucherType,
    },
};

// ============================================================================
// Enums
// ============================================================================

impl From<ledger::AccountType> for AccountType {
    fn from(value: ledger::AccountType) -> Self {
        match value {
            ledger::AccountType::Asset => Self::Asset,
            ledger::AccountType::Liability => Self::Liability,
            ledger::AccountType::Equity => Self::Equity,
            ledger::AccountType::Revenue => Self::Revenue,
            ledger::AccountType::Expense => Self::Expense,
        }
    }
}

impl From<AccountType> for ledger::AccountType {
    fn from(value: AccountType) -> Self {
        match value {
            AccountType::Asset => Self::Asset,
            AccountType::Liability => Self::Liability,
            AccountType::Equity => Self::Equity,
            AccountType::Revenue => Self::Revenue,
            AccountType::Expense => Self::Expense,
        }
    }
}

impl From<ledger::VoucherType> for VoucherType {
    fn from(value: ledger::VoucherType) -> Self {
        match value {
            ledger::VoucherType::Payment => Self::Payment,
            ledger::VoucherType::Receipt => Self::Receipt,
            ledger::VoucherType::Sales => Self::Sales,
            ledger::VoucherType::Purchase => Self::Purchase,
            ledger::VoucherType::Journal => Self::Journal,
            ledger::VoucherType::Contra => Self::Contra,
            ledger::VoucherType::DebitNote => Self::DebitNote,
            ledger::VoucherType::CreditNote => Self::CreditNote,
            ledger::VoucherType::Adjustment => Self::Adjustment,
        }
    }
}

impl From<VoucherType> for ledger::VoucherType {
    fn from(value: VoucherType) -> Self {
        match value {
            VoucherType::Payment => Self::Payment,
            VoucherType::Receipt => Self::Receipt,
            VoucherType::Sales => Self::Sales,
            VoucherType::Purchase => Self::Purchase,
            VoucherType::Journal => Self::Journal,
            VoucherType::Contra => Self::Contra,
            VoucherType::DebitNote => Self::DebitNote,
            VoucherType::CreditNote => Self::CreditNote,
            VoucherType::Adjustment => Self::Adjustment,
        }
    }
}

impl From<outstanding::OutstandingType> for OutstandingType {
    fn from(value: outstanding::OutstandingType) -> Self {
        match value {
            outstanding::OutstandingType::InvoiceReceivable => Self::InvoiceReceivable,
            outstanding::OutstandingType::InvoicePayable => Self::InvoicePayable,
            outstanding::OutstandingType::PurchaseOrder => Self::PurchaseOrder,
            outstanding::OutstandingType::AdvancePayment => Self::AdvancePayment,
            outstanding::OutstandingType::Expense => Self::Expense,
            outstanding::OutstandingType::Loan => Self::Loan,
            outstanding::OutstandingType::Other => Self::Other,
        }
    }
}

impl From<OutstandingType> for outstanding::OutstandingType {
    fn from(value: OutstandingType) -> Self {
        match value {
            OutstandingType::InvoiceReceivable => Self::InvoiceReceivable,
            OutstandingType::InvoicePayable => Self::InvoicePayable,
            OutstandingType::PurchaseOrder => Self::PurchaseOrder,
            OutstandingType::AdvancePayment => Self::AdvancePayment,
            OutstandingType::Expense => Self::Expense,
            OutstandingType::Loan => Self::Loan,
            OutstandingType::Other => Self::Other,
        }
    }
}

impl From<outstanding::OutstandingStatus> for OutstandingStatus {
    fn from(value: outstanding::OutstandingStatus) -> Self {
        match value {
            outstanding::OutstandingStatus::Pending => Self::Pending,
            outstanding::OutstandingStatus::Overdue => Self::Overdue,
            outstanding::OutstandingStatus::PartiallyPaid => Self::PartiallyPaid,
            outstanding::OutstandingStatus::Settled => Self::Settled,
            outstanding::OutstandingStatus::Disputed => Self::Disputed,
            outstanding::OutstandingStatus::Cancelled => Self::Cancelled,
        }
    }
}

impl From<OutstandingStatus> for outstanding::OutstandingStatus {
    fn from(value: OutstandingStatus) -> Self {
        match value {
            OutstandingStatus::Pending => Self::Pending,
            OutstandingStatus::Overdue => Self::Overdue,
            OutstandingStatus::PartiallyPaid => Self::PartiallyPaid,
            OutstandingStatus::Settled => Self::Settled,
            OutstandingStatus::Disputed => Self::Disputed,
            OutstandingStatus::Cancelled => Self::Cancelled,
        }
    }
}

impl From<Direction> for OutstandingDirection {
    fn from(value: Direction) -> Self {
        match value {
            Direction::Receivable => Self::Receivable,
            Direction::Payable => Self::Payable,
        }
    }
}

impl From<OutstandingDirection> for Direction {
    fn from(value: OutstandingDirection) -> Self {
        match value {
            OutstandingDirection::Receivable => Self::Receivable,
            OutstandingDirection::Payable => Self::Payable,
        }
    }
}

impl From<party::PartyKind> for PartyKind {
    fn from(value: party::PartyKind) -> Self {
        match value {
            party::PartyKind::Customer => Self::Customer,
            party::PartyKind::Supplier => Self::Supplier,
        }
    }
}

impl From<PartyKind> for party::PartyKind {
    fn from(value: PartyKind) -> Self {
        match value {
            PartyKind::Customer => Self::Customer,
            PartyKind::Supplier => Self::Supplier,
        }
    }
}

impl From<party::PartyLedgerStatus> for PartyLedgerStatus {
    fn from(value: party::PartyLedgerStatus) -> Self {
        match value {
            party::PartyLedgerStatus::Active => Self::Active,
            party::PartyLedgerStatus::Inactive => Self::Inactive,
            party::PartyLedgerStatus::Suspended => Self::Suspended,
        }
    }
}

impl From<PartyLedgerStatus> for party::PartyLedgerStatus {
    fn from(value: PartyLedgerStatus) -> Self {
        match value {
            PartyLedgerStatus::Active => Self::Active,
            PartyLedgerStatus::Inactive => Self::Inactive,
            PartyLedgerStatus::Suspended => Self::Suspended,
        }
    }
}

impl From<party::PartyEntryKind> for PartyEntryKind {
    fn from(value: party::PartyEntryKind) -> Self {
        match value {
            party::PartyEntryKind::Invoice => Self::Invoice,
            party::PartyEntryKind::Payment => Self::Payment,
            party::PartyEntryKind::Adjustment => Self::Adjustment,
        }
    }
}

impl From<PartyEntryKind> for party::PartyEntryKind {
    fn from(value: PartyEntryKind) -> Self {
        match value {
            PartyEntryKind::Invoice => Self::Invoice,
            PartyEntryKind::Payment => Self::Payment,
            PartyEntryKind::Adjustment => Self::Adjustment,
        }
    }
}

// ============================================================================
// Accounts
// ============================================================================

/// Builds a chart entry from a stored account.
#[must_use]
pub fn account_from_model(model: accounts::Model, has_postings: bool) -> Account {
    Account {
        id: AccountId::from_uuid(model.id),
        code: model.code,
        name: model.name,
        account_type: model.account_type.into(),
        parent_id: model.parent_id.map(AccountId::from_uuid),
        is_active: model.is_active,
        has_postings,
    }
}

// ============================================================================
// Outstandings
// ============================================================================

/// Builds a domain item from a stored row.
#[must_use]
pub fn outstanding_from_model(model: outstandings::Model) -> Outstanding {
    Outstanding {
        id: OutstandingId::from_uuid(model.id),
        outstanding_type: model.outstanding_type.into(),
        direction: model.direction.into(),
        reference_type: model.reference_type,
        reference_id: model.reference_id,
        reference_number: model.reference_number,
        original_amount: model.original_amount,
        amount: model.amount,
        due_date: model.due_date,
        days_overdue: model.days_overdue,
        status: model.status.into(),
        party_name: model.party_name,
        party_contact: model.party_contact,
        party_key: model.party_key,
        payment_method: model.payment_method,
        payment_reference: model.payment_reference,
        notes: model.notes,
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
        version: model.version,
    }
}

/// Full active model for inserting a new item.
#[must_use]
pub fn outstanding_to_active(item: &Outstanding) -> outstandings::ActiveModel {
    outstandings::ActiveModel {
        id: Set(item.id.into_inner()),
        outstanding_type: Set(item.outstanding_type.into()),
        direction: Set(item.direction.into()),
        reference_type: Set(item.reference_type.clone()),
        reference_id: Set(item.reference_id.clone()),
        reference_number: Set(item.reference_number.clone()),
        original_amount: Set(item.original_amount),
        amount: Set(item.amount),
        due_date: Set(item.due_date),
        days_overdue: Set(item.days_overdue),
        status: Set(item.status.into()),
        party_name: Set(item.party_name.clone()),
        party_contact: Set(item.party_contact.clone()),
        party_key: Set(item.party_key.clone()),
        payment_method: Set(item.payment_method.clone()),
        payment_reference: Set(item.payment_reference.clone()),
        notes: Set(item.notes.clone()),
        created_at: Set(item.created_at.into()),
        updated_at: Set(item.updated_at.into()),
        version: Set(item.version),
    }
}

// ============================================================================
// Advance credits
// ============================================================================

/// Builds a domain advance from a stored row.
#[must_use]
pub fn advance_from_model(model: advance_credits::Model) -> AdvanceCredit {
    AdvanceCredit {
        id: AdvanceCreditId::from_uuid(model.id),
        direction: model.direction.into(),
        party_key: model.party_key,
        party_name: model.party_name,
        original_amount: model.original_amount,
        remaining_amount: model.remaining_amount,
        source_reference: model.source_reference,
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    }
}

/// Full active model for inserting a new advance.
#[must_use]
pub fn advance_to_active(advance: &AdvanceCredit) -> advance_credits::ActiveModel {
    advance_credits::ActiveModel {
        id: Set(advance.id.into_inner()),
        direction: Set(advance.direction.into()),
        party_key: Set(advance.party_key.clone()),
        party_name: Set(advance.party_name.clone()),
        original_amount: Set(advance.original_amount),
        remaining_amount: Set(advance.remaining_amount),
        source_reference: Set(advance.source_reference.clone()),
        created_at: Set(advance.created_at.into()),
        updated_at: Set(advance.updated_at.into()),
    }
}

// ============================================================================
// Party ledgers
// ============================================================================

/// Builds a domain ledger from a stored row.
#[must_use]
pub fn party_ledger_from_model(model: party_ledgers::Model) -> PartyLedger {
    PartyLedger {
        id: PartyLedgerId::from_uuid(model.id),
        kind: model.kind.into(),
        party_name: model.party_name,
        phone: model.phone,
        email: model.email,
        address: PartyAddress {
            line1: model.address_line1,
            line2: model.address_line2,
            city: model.city,
            state: model.state,
            postal_code: model.postal_code,
        },
        opening_balance: model.opening_balance,
        current_balance: model.current_balance,
        total_debits: model.total_debits,
        total_credits: model.total_credits,
        status: model.status.into(),
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    }
}

/// Full active model for a ledger.
#[must_use]
pub fn party_ledger_to_active(ledger: &PartyLedger) -> party_ledgers::ActiveModel {
    party_ledgers::ActiveModel {
        id: Set(ledger.id.into_inner()),
        kind: Set(ledger.kind.into()),
        party_name: Set(ledger.party_name.clone()),
        phone: Set(ledger.phone.clone()),
        email: Set(ledger.email.clone()),
        address_line1: Set(ledger.address.line1.clone()),
        address_line2: Set(ledger.address.line2.clone()),
        city: Set(ledger.address.city.clone()),
        state: Set(ledger.address.state.clone()),
        postal_code: Set(ledger.address.postal_code.clone()),
        opening_balance: Set(ledger.opening_balance),
        current_balance: Set(ledger.current_balance),
        total_debits: Set(ledger.total_debits),
        total_credits: Set(ledger.total_credits),
        status: Set(ledger.status.into()),
        created_at: Set(ledger.created_at.into()),
        updated_at: Set(ledger.updated_at.into()),
    }
}

/// Builds a domain entry from a stored row.
#[must_use]
pub fn party_entry_from_model(model: party_ledger_entries::Model) -> PartyLedgerEntry {
    PartyLedgerEntry {
        id: PartyLedgerEntryId::from_uuid(model.id),
        ledger_id: PartyLedgerId::from_uuid(model.ledger_id),
        kind: model.entry_kind.into(),
        entry_date: model.entry_date,
        debit: model.debit,
        credit: model.credit,
        balance_after: model.balance_after,
        reference_type: model.reference_type,
        reference_id: model.reference_id,
        reference_number: model.reference_number,
        description: model.description,
        payment_method: model.payment_method,
        payment_reference: model.payment_reference,
        notes: model.notes,
        created_at: model.created_at.with_timezone(&Utc),
    }
}

/// Full active model for inserting an entry.
#[must_use]
pub fn party_entry_to_active(
    entry: &PartyLedgerEntry,
    voucher_id: Option<uuid::Uuid>,
) -> party_ledger_entries::ActiveModel {
    party_ledger_entries::ActiveModel {
        id: Set(entry.id.into_inner()),
        ledger_id: Set(entry.ledger_id.into_inner()),
        entry_kind: Set(entry.kind.into()),
        entry_date: Set(entry.entry_date),
        debit: Set(entry.debit),
        credit: Set(entry.credit),
        balance_after: Set(entry.balance_after),
        reference_type: Set(entry.reference_type.clone()),
        reference_id: Set(entry.reference_id.clone()),
        reference_number: Set(entry.reference_number.clone()),
        description: Set(entry.description.clone()),
        payment_method: Set(entry.payment_method.clone()),
        payment_reference: Set(entry.payment_reference.clone()),
        notes: Set(entry.notes.clone()),
        voucher_id: Set(voucher_id),
        created_at: Set(entry.created_at.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trip() {
        for status in outstanding::OutstandingStatus::ALL {
            let stored: OutstandingStatus = status.into();
            assert_eq!(outstanding::OutstandingStatus::from(stored), status);
        }
    }

    #[test]
    fn test_outstanding_type_direction_survives_storage() {
        for kind in outstanding::OutstandingType::ALL {
            let stored: OutstandingType = kind.into();
            let back = outstanding::OutstandingType::from(stored);
            assert_eq!(back.direction(), kind.direction());
        }
    }

    #[test]
    fn test_account_type_round_trip() {
        for kind in ledger::AccountType::ALL {
            let stored: AccountType = kind.into();
            assert_eq!(ledger::AccountType::from(stored), kind);
        }
    }
}
