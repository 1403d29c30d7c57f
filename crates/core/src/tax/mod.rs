//! Sales tax regime selection and computation.
//!
//! A sale inside the business's own state carries two components (central
//! and state tax, CGST + SGST). A sale to another state carries a single
//! integrated component (IGST). Every component is rounded half-up to 2
//! decimal places per line before totals are taken.

pub mod engine;
pub mod error;
pub mod types;

pub use engine::TaxEngine;
pub use error::TaxError;
pub use types::{LineTax, TaxBreakdown, TaxLine, TaxRates, TaxType, TaxableProduct};
