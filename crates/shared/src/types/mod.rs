//! Common types used across the application.

pub mod id;
pub mod money;
pub mod pagination;

pub use id::*;
pub use money::{
    BALANCE_TOLERANCE, CurrencyCode, from_minor_units, is_within_tolerance, to_minor_units,
};
pub use pagination::{DEFAULT_PER_PAGE, MAX_PER_PAGE, PageMeta, PageRequest, PageResponse};
