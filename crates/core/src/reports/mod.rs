//! Financial report generation.
//!
//! This module provides pure business logic for:
//! - Trial Balance (two-column, sign-normalized per account type)
//! - Single account balance as of a date

pub mod error;
pub mod service;
pub mod types;

#[cfg(test)]
mod tests;

pub use error::ReportRuleError;
pub use service::ReportService;
pub use types::*;
