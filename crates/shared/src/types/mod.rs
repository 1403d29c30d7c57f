//! Common types used across the application.

pub mod date_range;
pub mod id;
pub mod money;
pub mod pagination;

pub use date_range::DateRange;
pub use id::*;
pub use money::{is_currency_scale, round_currency};
pub use pagination::{PageRequest, PageResponse};
