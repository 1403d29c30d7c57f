//! Entity re-exports.

pub use super::accounts::Entity as Accounts;
pub use super::advance_credits::Entity as AdvanceCredits;
pub use super::document_sequences::Entity as DocumentSequences;
pub use super::outstandings::Entity as Outstandings;
pub use super::party_ledger_entries::Entity as PartyLedgerEntries;
pub use super::party_ledgers::Entity as PartyLedgers;
pub use super::voucher_entries::Entity as VoucherEntries;
pub use super::vouchers::Entity as Vouchers;
