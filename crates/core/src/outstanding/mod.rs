//! Outstanding items: amounts owed to or by the business.
//!
//! Each item is tied to one source document and moves through a closed
//! status lifecycle:
//!
//! ```text
//! PENDING ──(due date passes)──> OVERDUE
//!    │                              │
//!    └──────────> PARTIALLY_PAID <──┘
//!                       │
//!                       v
//!                    SETTLED
//! ```
//!
//! Any non-terminal item may also move to DISPUTED or CANCELLED. SETTLED and
//! CANCELLED are terminal.

pub mod error;
pub mod filter;
pub mod service;
pub mod types;

#[cfg(test)]
mod service_props;

pub use error::OutstandingError;
pub use filter::{OutstandingFilter, OutstandingSummary};
pub use service::OutstandingService;
pub use types::{
    Direction, NewOutstanding, Outstanding, OutstandingStatus, OutstandingType, PaymentDetails,
    party_key,
};
