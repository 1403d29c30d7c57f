//! Financial report generation.
//!
//! This module provides pure business logic for generating financial reports:
//! - Trial Balance
//! - Balance Sheet
//! - Profit & Loss
//! - Account Statement
//!
//! Every report is a pure function of stored postings. Callers aggregate
//! postings (in SQL or in memory via [`ReportService::aggregate`]) and pass the
//! per-account totals in.

pub mod error;
pub mod service;
pub mod types;


pub use error::ReportError;
pub use service::ReportService;
pub use types::*;
