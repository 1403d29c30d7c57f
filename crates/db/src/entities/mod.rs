//! `SeaORM` entity definitions.

pub mod prelude;

pub mod accounts;
pub mod advance_credits;
pub mod document_sequences;
pub mod outstandings;
pub mod party_ledger_entries;
pub mod party_ledgers;
pub mod sea_orm_active_enums;
pub mod voucher_entries;
pub mod vouchers;
