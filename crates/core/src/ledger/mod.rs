//! Double-entry bookkeeping logic.
//!
//! This module implements the core ledger functionality:
//! - Account types and their normal balance side
//! - The chart of accounts (arena with cycle-free hierarchy)
//! - Voucher input types
//! - Voucher validation (balance, accounts, amounts)
//! - Error types for ledger operations

pub mod balance;
pub mod chart;
pub mod error;
pub mod service;
pub mod types;

#[cfg(test)]
mod validation_props;

pub use balance::{AccountTotals, NormalBalance};
pub use chart::{Account, ChartOfAccounts, NewAccount};
pub use error::LedgerError;
pub use service::LedgerService;
pub use types::{
    AccountType, CreateVoucherInput, ResolvedEntry, VoucherEntryInput, VoucherTotals, VoucherType,
};
