//! Core bookkeeping logic for Bahi.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! All domain types, validation rules, and calculations live here.
//!
//! # Modules
//!
//! - `ledger` - Chart of accounts and double-entry voucher validation
//! - `reports` - Trial balance, balance sheet, profit & loss
//! - `outstanding` - Amounts owed to and by the business, with a status lifecycle
//! - `allocation` - Oldest-first payment allocation and advance credits
//! - `party` - Customer and supplier running-balance ledgers
//! - `tax` - Intra-state (CGST+SGST) vs inter-state (IGST) tax computation
//! - `documents` - Facts supplied by order finalization
//! - `sequence` - Document number formatting

pub mod allocation;
pub mod documents;
pub mod ledger;
pub mod outstanding;
pub mod party;
pub mod reports;
pub mod sequence;
pub mod tax;
