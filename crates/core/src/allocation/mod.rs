//! Oldest-first payment allocation with advance credit carry-over.
//!
//! A payment is applied to a party's open outstanding items in creation
//! order. Whatever is left after every item is settled becomes an advance
//! credit, which is drawn down (oldest advance first) by the next items
//! opened for the same party.
//!
//! Money is conserved on every path:
//!
//! ```text
//! payment == sum(applied) + leftover
//! ```

pub mod allocator;
pub mod error;
pub mod types;

#[cfg(test)]
mod allocator_props;

pub use allocator::PaymentAllocator;
pub use error::AllocationError;
pub use types::{AdvanceCredit, AdvanceDraw, AllocationOutcome, Application};
