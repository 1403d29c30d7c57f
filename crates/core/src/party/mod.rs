//! Customer and supplier running-balance ledgers.
//!
//! A party ledger keeps one counter-party's totals together with an
//! append-only entry history. After every entry:
//!
//! ```text
//! current_balance == opening_balance + total_debits - total_credits
//! last_entry.balance_after == current_balance
//! ```

pub mod error;
pub mod service;
pub mod types;

#[cfg(test)]
mod service_props;

pub use error::PartyLedgerError;
pub use service::PartyLedgerService;
pub use types::{
    EntryDraft, NewPartyLedger, PartyAddress, PartyDashboard, PartyEntryKind, PartyKind,
    PartyLedger, PartyLedgerEntry, PartyLedgerStatus, normalize_phone,
};
