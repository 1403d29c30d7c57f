//! Repository abstractions for data access.
//!
//! Repositories persist the decisions made by `bahi-core`, hiding the
//! `SeaORM` implementation details from the rest of the application.

pub mod account;
pub mod outstanding;
pub mod party_ledger;
pub mod payment;
pub mod report;
pub mod sequence;
pub mod voucher;

pub use account::{AccountError, AccountRepository};
pub use outstanding::{CreatedOutstanding, OutstandingRepoError, OutstandingRepository, SweepReport};
pub use party_ledger::{
    BackfillReport, PartyLedgerRepoError, PartyLedgerRepository, PaymentEntryInput,
    PaymentEntryResult,
};
pub use payment::{PaymentInput, PaymentRepository, PaymentResult};
pub use report::{ReportQueryError, ReportRepository};
pub use sequence::SequenceRepository;
pub use voucher::{Voucher, VoucherError, VoucherFilter, VoucherLine, VoucherRepository, VoucherSummary};
